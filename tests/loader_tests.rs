#[cfg(test)]
mod tests {
    use serde_json::json;
    use stamp::{Error, Template};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_log::test;

    fn tag(name: &str) -> Template {
        Template::new(name).unwrap()
    }

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_requires_an_existing_file() {
        let str = tag("Methods");

        assert!(matches!(str.file("missing.in"), Err(Error::Io(_))));
    }

    #[test]
    fn test_loads_and_renders() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "greeting.in",
            "\n        Hi, ${ name }!\n\n    Do you like being a ${ job }?\n",
        );

        let str = tag("Methods");
        let greeting = str.file(path).unwrap();

        let result = greeting
            .render(&[json!({ "name": "Alice", "job": "programmer" })])
            .unwrap();

        assert_eq!(
            result.to_string(),
            "    Hi, Alice!\n\nDo you like being a programmer?"
        );
    }

    #[test]
    fn test_lists_placeholders() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "list.in", "${ person.name } has ${ person.pets[0] }");

        let str = tag("Methods");
        let template = str.file(path).unwrap();

        assert_eq!(template.placeholders(), vec!["person.name", "person.pets[0]"]);
    }

    #[test]
    fn test_searches_scopes_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "greeting.in", "${ name } is a ${ job }");

        let str = tag("Methods");
        let greeting = str.file(path).unwrap();

        let person = json!({ "name": "Alice" });
        let other = json!({ "name": "Bob", "job": "programmer" });

        let result = greeting.render(&[person, other]).unwrap();
        assert_eq!(result.to_string(), "Alice is a programmer");
    }

    #[test]
    fn test_property_paths() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "paths.in",
            "${ person.name }: ${ person.options[0] } or ${ person.options[1] }",
        );

        let str = tag("Methods");
        let template = str.file(path).unwrap();

        let scope = json!({
            "person": { "name": "Alice", "options": ["yes", "no"] }
        });

        assert_eq!(
            template.render(&[scope]).unwrap().to_string(),
            "Alice: yes or no"
        );
    }

    #[test]
    fn test_computed_lookups() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "pick.in", "${ options[choice] } and ${ table[key] }");

        let str = tag("Methods");
        let template = str.file(path).unwrap();

        let scope = json!({
            "options": ["yes", "no"],
            "choice": 1,
            "table": { "a": "left", "b": "right" },
            "key": "b"
        });

        assert_eq!(template.render(&[scope]).unwrap().to_string(), "no and right");
    }

    #[test]
    fn test_missing_references_fail() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "greeting.in", "Hi, ${ name }!");

        let str = tag("Methods");
        let greeting = str.file(path).unwrap();

        match greeting.render(&[]) {
            Err(Error::ReferenceNotFound { name, template }) => {
                assert_eq!(name, "name");
                assert_eq!(template, "Methods");
            }
            other => panic!("expected a reference error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_properties_fail() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "deep.in", "${ person.address.city }");

        let str = tag("Methods");
        let template = str.file(path).unwrap();

        let result = template.render(&[json!({ "person": { "name": "Alice" } })]);
        assert!(matches!(result, Err(Error::ReferenceNotFound { .. })));
    }

    #[test]
    fn test_rejects_malformed_placeholders_at_load() {
        let dir = TempDir::new().unwrap();

        for body in ["${ }", "${ name", "${ 9lives }", "${ a[ }"] {
            let path = write(&dir, "bad.in", body);
            let str = tag("Methods");
            assert!(
                matches!(str.file(&path), Err(Error::Syntax { .. })),
                "expected a syntax error for {body:?}"
            );
        }
    }

    #[test]
    fn test_escaped_placeholders() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "escape.in", r"cost: \${ amount }");

        let str = tag("Methods");
        let template = str.file(path).unwrap();

        assert_eq!(template.render(&[]).unwrap().to_string(), "cost: ${ amount }");
    }

    #[test]
    fn test_reindents_file_substitutions() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "items.in", "items:\n    ${ items }\nend\n");

        let str = tag("Methods");
        let template = str.file(path).unwrap();

        let result = template.render(&[json!({ "items": "a\nb" })]).unwrap();
        assert_eq!(result.to_string(), "items:\n    a\n    b\nend");
    }

    #[test]
    fn test_uses_custom_indent_characters() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "todo.in",
            " TODO:\n    > Write ${ first }\n    > Test code\n",
        );

        let mut str = tag("Methods");
        str.set_indent("\t >");

        let template = str.file(path).unwrap();
        let result = template.render(&[json!({ "first": "code" })]).unwrap();

        assert_eq!(result.to_string(), " TODO:\nWrite code\nTest code");
    }
}
