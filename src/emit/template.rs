//! Template types for typed variable injection.

use std::marker::PhantomData;

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

/// Variables for the assets file.
pub struct AssetsVars<'a> {
    pub body: &'a str,
}

impl TemplateVars for AssetsVars<'_> {
    fn apply(&self, content: &str) -> String {
        content.replace("__BODY__", self.body)
    }
}

/// Variables for one route handler.
pub struct HandlerVars<'a> {
    pub handler: &'a str,
    pub headers: &'a str,
    pub constant: &'a str,
}

impl TemplateVars for HandlerVars<'_> {
    fn apply(&self, content: &str) -> String {
        content
            .replace("__HANDLER__", self.handler)
            .replace("__HEADERS__", self.headers)
            .replace("__CONSTANT__", self.constant)
    }
}

/// Variables for the routes file.
pub struct RoutesVars<'a> {
    pub visibility: &'a str,
    pub module: &'a str,
    pub handlers: &'a str,
    pub registrations: &'a str,
}

impl TemplateVars for RoutesVars<'_> {
    fn apply(&self, content: &str) -> String {
        // Handlers last: their bodies may contain arbitrary text.
        content
            .replace("__VISIBILITY__", self.visibility)
            .replace("__MODULE__", self.module)
            .replace("__REGISTRATIONS__", self.registrations)
            .replace("__HANDLERS__", self.handlers)
    }
}

pub const ASSETS_RS: Template<AssetsVars<'static>> =
    Template::new(include_str!("templates/assets.rs.tmpl"));

pub const ROUTES_RS: Template<RoutesVars<'static>> =
    Template::new(include_str!("templates/routes.rs.tmpl"));

pub const HANDLER_RS: Template<HandlerVars<'static>> =
    Template::new(include_str!("templates/handler.rs.tmpl"));
