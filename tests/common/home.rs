//! Isolated server home

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

use sitedeck::{Config, RequestRouter, Supervisor};

pub struct TestHome {
    _dir: TempDir,
    root: PathBuf,
    stamp: u64,
}

impl TestHome {
    /// Home with empty `webapps/`, `contexts/` and `etc/`
    pub fn new() -> Self {
        let home = Self::missing();
        for dir in ["webapps", "contexts", "etc"] {
            fs::create_dir_all(home.root.join(dir)).unwrap();
        }
        home
    }

    /// Home path that does not exist yet
    pub fn missing() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("jetty");
        Self {
            _dir: dir,
            root,
            stamp: 1_000,
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write `webapps/<name>/WEB-INF/web.toml` with a fresh timestamp.
    pub fn webapp(&mut self, name: &str, descriptor: &str) -> PathBuf {
        let root = self.root.join("webapps").join(name);
        fs::create_dir_all(root.join("WEB-INF/lib")).unwrap();
        let file = root.join("WEB-INF/web.toml");
        fs::write(&file, descriptor).unwrap();
        self.bump(&file);
        root
    }

    /// Drop a library artifact into a webapp.
    pub fn lib(&mut self, app: &str, file: &str, bytes: &[u8]) -> PathBuf {
        let path = self.root.join("webapps").join(app).join("WEB-INF/lib").join(file);
        fs::write(&path, bytes).unwrap();
        self.bump(&path);
        path
    }

    /// Write `contexts/<name>.toml`.
    pub fn context_file(&mut self, name: &str, body: &str) -> PathBuf {
        let path = self.root.join("contexts").join(format!("{name}.toml"));
        fs::write(&path, body).unwrap();
        self.bump(&path);
        path
    }

    /// Application root outside the scanned directories
    pub fn standalone_app(&mut self, name: &str, descriptor: &str) -> PathBuf {
        let root = self.root.join("apps").join(name);
        fs::create_dir_all(root.join("WEB-INF")).unwrap();
        let file = root.join("WEB-INF/web.toml");
        fs::write(&file, descriptor).unwrap();
        self.bump(&file);
        root
    }

    pub fn remove_webapp(&self, name: &str) {
        fs::remove_dir_all(self.root.join("webapps").join(name)).unwrap();
    }

    pub fn etc_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join("etc").join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// Give `file` a strictly increasing timestamp in the future.
    pub fn bump(&mut self, file: &Path) {
        self.stamp += 60;
        File::options()
            .write(true)
            .open(file)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(self.stamp))
            .unwrap();
    }

    /// Loopback on an ephemeral port, no background rescans
    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.server.home = self.root.clone();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.webapps.scan_interval = Some(0);
        config.contexts.scan_interval = Some(0);
        config
    }

    pub fn supervisor(&self, config: &Config, router: Arc<dyn RequestRouter>) -> Supervisor {
        Supervisor::new(config.server_plan(), config.host_services()).with_router(router)
    }
}
