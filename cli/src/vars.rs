use std::path::{Path, PathBuf};

use renderer::{Value, VariableMap};

/// Parse a `NAME=VALUE` command-line binding.
pub fn parse_binding(s: &str) -> Result<(String, Value), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", s));
    }
    Ok((name.to_string(), parse_arg(raw)))
}

/// "true"/"false" become Boolean and canonical integers become Integer;
/// everything else stays a String. Either way the rendered text is `s`.
fn parse_arg(s: &str) -> Value {
    match s {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => Value::Integer(n),
            _ => Value::String(s.to_string()),
        },
    }
}

/// Bindings from a TOML table. Nested tables flatten into dotted names, so
/// `[user] name = "x"` binds `user.name`.
pub fn from_toml_table(table: &toml::Table) -> VariableMap {
    let mut vars = VariableMap::new();
    flatten_into(&mut vars, None, table);
    vars
}

fn flatten_into(vars: &mut VariableMap, prefix: Option<&str>, table: &toml::Table) {
    for (key, value) in table {
        let name = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };
        match value {
            toml::Value::Table(inner) => flatten_into(vars, Some(&name), inner),
            other => {
                vars.insert(name, toml_to_value(other));
            }
        }
    }
}

fn toml_to_value(val: &toml::Value) -> Value {
    match val {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(n) => Value::Integer(*n),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::Boolean(b) => Value::Boolean(*b),
        other => Value::String(other.to_string()),
    }
}

pub fn load_file(path: &Path) -> Result<VariableMap, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    let table: toml::Table = toml::from_str(&text)
        .map_err(|e| format!("invalid TOML in '{}': {}", path.display(), e))?;
    Ok(from_toml_table(&table))
}

/// Variable files in order, then command-line bindings on top.
pub fn collect(files: &[PathBuf], bindings: &[(String, Value)]) -> Result<VariableMap, String> {
    let mut vars = VariableMap::new();
    for path in files {
        vars.extend(load_file(path)?);
    }
    vars.extend(bindings.iter().cloned());
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_keep_their_text() {
        for raw in ["42", "-3", "true", "false", "007", "1.50", "1e3", "", "a=b"] {
            let (_, value) = parse_binding(&format!("x={}", raw)).unwrap();
            assert_eq!(value.to_string(), raw);
        }
        assert_eq!(parse_binding("n=42").unwrap().1, Value::Integer(42));
        assert_eq!(parse_binding("n=007").unwrap().1, Value::from("007"));
        assert_eq!(parse_binding("b=true").unwrap().1, Value::Boolean(true));
    }

    #[test]
    fn malformed_bindings() {
        assert!(parse_binding("novalue").is_err());
        assert!(parse_binding("=value").is_err());
    }

    #[test]
    fn nested_tables_flatten() {
        let table: toml::Table = toml::from_str(
            r#"
            title = "Report"
            count = 3
            ratio = 0.5
            draft = false
            tags = ["a", "b"]

            [user]
            name = "ada"

            [user.address]
            city = "London"
            "#,
        )
        .unwrap();
        let vars = from_toml_table(&table);
        assert_eq!(vars.get("title"), Some(&Value::from("Report")));
        assert_eq!(vars.get("count"), Some(&Value::Integer(3)));
        assert_eq!(vars.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(vars.get("draft"), Some(&Value::Boolean(false)));
        assert_eq!(vars.get("user.name"), Some(&Value::from("ada")));
        assert_eq!(vars.get("user.address.city"), Some(&Value::from("London")));
        assert!(vars.get("tags").is_some_and(|v| v.to_string().contains("\"b\"")));
        assert!(!vars.contains("user"));
    }

    #[test]
    fn command_line_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        std::fs::write(&first, "a = \"file1\"\nb = \"file1\"\nc = \"file1\"").unwrap();
        std::fs::write(&second, "b = \"file2\"\nc = \"file2\"").unwrap();

        let vars = collect(
            &[first, second],
            &[("c".to_string(), Value::from("cli"))],
        )
        .unwrap();
        assert_eq!(vars.get("a"), Some(&Value::from("file1")));
        assert_eq!(vars.get("b"), Some(&Value::from("file2")));
        assert_eq!(vars.get("c"), Some(&Value::from("cli")));
    }

    #[test]
    fn unreadable_file_is_reported() {
        let err = load_file(Path::new("/no/such/vars.toml")).unwrap_err();
        assert!(err.contains("/no/such/vars.toml"));
    }
}
