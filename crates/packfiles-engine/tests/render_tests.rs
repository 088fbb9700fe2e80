//! Integration tests rendering manifests against on-disk files

use packfiles_core::codec;
use packfiles_engine::{Engine, EngineError};
use serde_json::json;
use tempfile::TempDir;

/// Lay out a small pack directory
fn fixture_pack() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    std::fs::create_dir_all(root.join("config/nginx")).unwrap();
    std::fs::create_dir_all(root.join("secrets")).unwrap();

    std::fs::write(root.join("config/app.yaml"), "replicas: 3\nlog: debug\n").unwrap();
    std::fs::write(
        root.join("config/nginx/nginx.conf"),
        "server {\n  listen 80;\n}\n",
    )
    .unwrap();
    std::fs::write(root.join("secrets/user"), "admin").unwrap();
    std::fs::write(root.join("secrets/password"), "s3cr3t").unwrap();

    temp
}

fn render(engine: &Engine, template: &str) -> Result<String, EngineError> {
    engine.render_string(template, &json!({"name": "web"}), "manifest.yaml")
}

mod configmap {
    use super::*;

    #[test]
    fn test_recursive_glob_as_config() {
        let pack = fixture_pack();
        let engine = Engine::new(pack.path());

        let template = "kind: ConfigMap\ndata:{{ files.glob(\"config/**/*\").as_config() | nindent(2) }}";
        let output = render(&engine, template).unwrap();

        let doc: serde_json::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(doc["kind"], json!("ConfigMap"));
        assert_eq!(doc["data"]["app.yaml"], json!("replicas: 3\nlog: debug\n"));
        assert_eq!(doc["data"]["nginx.conf"], json!("server {\n  listen 80;\n}\n"));
    }

    #[test]
    fn test_trailing_recursive_glob_as_config() {
        let pack = fixture_pack();
        let engine = Engine::new(pack.path());

        let template = "data:{{ files.glob(\"config/**\").as_config() | nindent(2) }}";
        let output = render(&engine, template).unwrap();

        let doc: serde_json::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(doc["data"]["app.yaml"], json!("replicas: 3\nlog: debug\n"));
        assert_eq!(doc["data"]["nginx.conf"], json!("server {\n  listen 80;\n}\n"));
    }

    #[test]
    fn test_embedded_file_parsed_with_fromyaml() {
        let pack = fixture_pack();
        let engine = Engine::new(pack.path());

        let template = "{% set app = files.get(\"config/app.yaml\") | fromyaml %}replicas: {{ app.replicas }}";
        assert_eq!(render(&engine, template).unwrap(), "replicas: 3");
    }

    #[test]
    fn test_empty_glob_renders_empty_map() {
        let pack = fixture_pack();
        let engine = Engine::new(pack.path());

        let output = render(&engine, "{{ files.glob(\"nothing/*\").as_config() }}").unwrap();
        let doc: serde_json::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(doc, json!({}));
    }
}

mod secret {
    use super::*;

    #[test]
    fn test_glob_as_secrets() {
        let pack = fixture_pack();
        let engine = Engine::new(pack.path());

        let output = render(&engine, "{{ files.glob(\"secrets/*\") | assecrets }}").unwrap();
        let doc: serde_json::Value = serde_yaml::from_str(&output).unwrap();

        assert_eq!(doc, json!({"password": "czNjcjN0", "user": "YWRtaW4="}));
    }
}

mod conversions {
    use super::*;

    #[test]
    fn test_toml_and_json_output() {
        let pack = fixture_pack();
        let engine = Engine::new(pack.path());

        let values = json!({"server": {"host": "0.0.0.0", "port": 80}});
        let output = engine
            .render_string(
                "{{ values.server | totoml }}---\n{{ values.server | tojson }}",
                &values,
                "t",
            )
            .unwrap();

        let (toml_part, json_part) = output.split_once("---\n").unwrap();
        assert!(toml_part.contains("host = \"0.0.0.0\""));
        assert!(toml_part.contains("port = 80"));

        let parsed: serde_json::Value = serde_json::from_str(json_part).unwrap();
        assert_eq!(parsed, values["server"]);
    }

    #[test]
    fn test_toml_failure_renders_error_text() {
        let pack = fixture_pack();
        let engine = Engine::new(pack.path());

        let output = engine
            .render_string("[{{ values.list | totoml }}]", &json!({"list": [1, 2]}), "t")
            .unwrap();

        let message = codec::try_to_toml(&json!([1, 2])).unwrap_err().to_string();
        assert_eq!(output, format!("[{}]", message));
    }
}

mod fatal_errors {
    use super::*;

    #[test]
    fn test_missing_file_yields_no_output() {
        let pack = fixture_pack();
        let engine = Engine::new(pack.path());

        let result = render(&engine, "kind: ConfigMap\ndata: {{ files.get(\"config/absent.yaml\") }}");
        let err = result.unwrap_err();

        assert!(err.file_error().is_some());
        assert!(err.to_string().contains("config/absent.yaml"));
    }

    #[test]
    fn test_absolute_path_is_rejected() {
        let pack = fixture_pack();
        let engine = Engine::new(pack.path());

        let absolute = pack.path().join("secrets/user");
        let template = format!("{{{{ files.get({:?}) }}}}", absolute.to_string_lossy());

        let err = render(&engine, &template).unwrap_err();
        assert!(matches!(err, EngineError::FileAccess(_)));
    }
}
