//! Descriptor fixtures

/// Descriptor with one servlet mapped at the context root
pub const SERVLET_DESCRIPTOR: &str = r#"
[[servlet]]
name = "main"
class = "org.example.Main"
url_patterns = ["/"]
"#;

/// Descriptor that parses but fails validation
pub const INVALID_DESCRIPTOR: &str = r#"
[[servlet]]
name = "main"
class = "org.example.Main"
url_patterns = ["no-leading-slash"]
"#;

pub const REALM_FILE: &str = "\
# console users
operator: changeit, operator
";
