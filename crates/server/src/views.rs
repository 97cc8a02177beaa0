// Server-rendered views
// Decision: Templates are embedded at compile time and loaded into one minijinja Environment at startup
// Decision: The error view is self-contained so it can render without the shared environment

use axum::response::Html;
use hushboard_core::{Error, Result};
use minijinja::{context, Environment, Value};
use std::sync::Arc;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("submit.html", include_str!("../templates/submit.html")),
    ("secrets.html", include_str!("../templates/secrets.html")),
];

/// Standalone error page
pub const ERROR_TEMPLATE: &str = include_str!("../templates/error.html");

/// Page templates available to handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Login,
    Register,
    Submit,
    Secrets,
}

impl View {
    pub fn template_name(&self) -> &'static str {
        match self {
            View::Home => "home.html",
            View::Login => "login.html",
            View::Register => "register.html",
            View::Submit => "submit.html",
            View::Secrets => "secrets.html",
        }
    }
}

#[derive(Clone)]
pub struct Views {
    env: Arc<Environment<'static>>,
}

impl Views {
    pub fn new() -> anyhow::Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| anyhow::anyhow!("Failed to load template {}: {}", name, e))?;
        }
        Ok(Self { env: Arc::new(env) })
    }

    /// Render a view with the given context
    pub fn render(&self, view: View, ctx: Value) -> Result<Html<String>> {
        let template = self
            .env
            .get_template(view.template_name())
            .map_err(|e| Error::Internal(anyhow::Error::new(e).context("Template lookup failed")))?;

        template
            .render(ctx)
            .map(Html)
            .map_err(|e| Error::Internal(anyhow::Error::new(e).context("Template render failed")))
    }

    pub fn home(&self) -> Result<Html<String>> {
        self.render(View::Home, context! {})
    }

    /// Login form, optionally with a message for a failed attempt
    pub fn login(&self, error: Option<&str>) -> Result<Html<String>> {
        self.render(View::Login, context! { error => error })
    }

    pub fn register(&self) -> Result<Html<String>> {
        self.render(View::Register, context! {})
    }

    pub fn submit(&self) -> Result<Html<String>> {
        self.render(View::Submit, context! {})
    }

    /// Secrets wall; only the secret strings are handed to the template
    pub fn secrets(&self, secrets: &[String], authenticated: bool) -> Result<Html<String>> {
        self.render(
            View::Secrets,
            context! { secrets => secrets, authenticated => authenticated },
        )
    }
}

/// Render the error page; falls back to plain markup if the template itself fails
pub fn render_error_page(title: &str, message: &str) -> Html<String> {
    let env = Environment::new();
    let rendered = env
        .template_from_named_str("error.html", ERROR_TEMPLATE)
        .and_then(|t| t.render(context! { title => title, message => message }));

    match rendered {
        Ok(html) => Html(html),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            Html("<h1>Something went wrong</h1>".to_string())
        }
    }
}
