//! Template engine based on MiniJinja

use std::path::PathBuf;

use minijinja::{AutoEscape, Environment};
use packfiles_core::Dir;

use crate::error::{EngineError, Result};
use crate::filters;
use crate::files_object::create_files_value;

/// Template engine builder
#[derive(Debug)]
pub struct EngineBuilder {
    strict_mode: bool,
    base_dir: PathBuf,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            strict_mode: true,
            base_dir: PathBuf::from("."),
        }
    }

    /// Set strict mode (fail on undefined variables)
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Directory that `files.get` and `files.glob` resolve against
    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Build the engine
    pub fn build(self) -> Engine {
        Engine {
            strict_mode: self.strict_mode,
            dir: Dir::new(self.base_dir),
        }
    }
}

/// The template engine
///
/// Each render gets a fresh environment; the filesystem is read again on every
/// `files` call.
#[derive(Debug)]
pub struct Engine {
    strict_mode: bool,
    dir: Dir,
}

impl Engine {
    /// Create a strict engine for a base directory
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::builder().base_dir(base_dir).build()
    }

    /// Create a builder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Directory that template `files` calls resolve against
    pub fn dir(&self) -> &Dir {
        &self.dir
    }

    /// Create a configured MiniJinja environment
    fn create_environment(&self) -> Environment<'static> {
        let mut env = Environment::new();

        if self.strict_mode {
            env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        } else {
            env.set_undefined_behavior(minijinja::UndefinedBehavior::Lenient);
        }
        // Output is YAML/JSON/TOML, never markup
        env.set_auto_escape_callback(|_| AutoEscape::None);

        env.add_filter("toyaml", filters::toyaml);
        env.add_filter("fromyaml", filters::fromyaml);
        env.add_filter("totoml", filters::totoml);
        env.add_filter("tojson", filters::tojson);
        env.add_filter("fromjson", filters::fromjson);
        env.add_filter("asconfig", filters::asconfig);
        env.add_filter("assecrets", filters::assecrets);
        env.add_filter("b64encode", filters::b64encode);
        env.add_filter("indent", filters::indent);
        env.add_filter("nindent", filters::nindent);

        env.add_global("files", create_files_value(self.dir.clone()));

        env
    }

    /// Render a single template string
    ///
    /// `values` is exposed to the template as `values`.
    pub fn render_string(
        &self,
        template: &str,
        values: &serde_json::Value,
        template_name: &str,
    ) -> Result<String> {
        let mut env = self.create_environment();

        env.add_template_owned(template_name.to_string(), template.to_string())
            .map_err(|e| EngineError::from_minijinja(e, template_name, template))?;

        let tmpl = env
            .get_template(template_name)
            .map_err(|e| EngineError::from_minijinja(e, template_name, template))?;

        let ctx = minijinja::context! {
            values => values,
        };

        tracing::debug!(template = template_name, base = %self.dir.base().display(), "rendering");
        tmpl.render(ctx)
            .map_err(|e| EngineError::from_minijinja(e, template_name, template))
    }

    /// Render a template file located under the base directory
    ///
    /// A missing template is a fatal file error, like any other `files` lookup.
    pub fn render_file(&self, name: &str, values: &serde_json::Value) -> Result<String> {
        let template = self.dir.get(name)?;
        self.render_string(&template, values, name)
    }
}
