//! Per-invocation context: which repository, which transport, which settings
//!
//! A [`Session`] is built once in `main` and handed to every command. There is
//! no global state. The session owns the label and milestone cache, and every
//! [`BulkEditor`] or [`ReferenceResolver`] it hands out shares that cache.

use std::cell::Ref;
use std::process::Command;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::api::{HttpTransport, Transport};
use crate::bulk::{BulkEditor, ReferenceCache, ReferenceResolver, SharedCache};
use crate::config::{DEFAULT_API_URL, GhxConfig};
use crate::scope::{Scope, ScopeError};
use crate::GhxError;

type Result<T> = std::result::Result<T, GhxError>;

const GITHUB_TOKEN_VARS: &[&str] = &["GH_TOKEN", "GITHUB_TOKEN"];
const ENTERPRISE_TOKEN_VARS: &[&str] = &["GH_ENTERPRISE_TOKEN", "GITHUB_ENTERPRISE_TOKEN"];

pub struct Session {
    scope: Scope,
    transport: Box<dyn Transport>,
    config: GhxConfig,
    cache: SharedCache,
}

impl Session {
    #[must_use]
    pub fn new(scope: Scope, transport: Box<dyn Transport>, config: GhxConfig) -> Self {
        Self {
            scope,
            transport,
            config,
            cache: SharedCache::default(),
        }
    }

    /// Resolve scope and credentials and open an HTTP transport
    ///
    /// # Errors
    /// `GhxError::Scope` when no repository can be determined,
    /// `GhxError::Credentials` when no token is available, and
    /// `GhxError::Api` if the HTTP client cannot be built.
    pub fn connect(config: GhxConfig, repo_flag: Option<&str>) -> Result<Self> {
        let scope = resolve_scope(
            repo_flag,
            config.default_repo.as_deref(),
            Scope::from_git_origin,
        )?;
        let token = resolve_token(&config.api_url, |var| std::env::var(var).ok(), gh_auth_token)
            .ok_or_else(|| {
                GhxError::Credentials(
                    "No GitHub token found. Set GH_TOKEN or run 'gh auth login'".into(),
                )
            })?;
        let transport = HttpTransport::new(
            &config.api_url,
            token,
            Duration::from_secs(config.timeout_secs),
        )?;
        debug!(%scope, api_url = %config.api_url, "session ready");
        Ok(Self::new(scope, Box::new(transport), config))
    }

    #[must_use]
    pub const fn scope(&self) -> &Scope {
        &self.scope
    }

    #[must_use]
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    #[must_use]
    pub const fn config(&self) -> &GhxConfig {
        &self.config
    }

    /// The session's reference cache, for inspection
    #[must_use]
    pub fn cache(&self) -> Ref<'_, ReferenceCache> {
        self.cache.borrow()
    }

    #[must_use]
    pub fn bulk_editor(&self) -> BulkEditor<'_> {
        BulkEditor::with_resolver(self.transport(), self.scope.clone(), self.resolver())
    }

    #[must_use]
    pub fn resolver(&self) -> ReferenceResolver<'_> {
        ReferenceResolver::with_cache(self.transport(), Rc::clone(&self.cache))
    }
}

/// Pick the repository: explicit flag, then configured default, then git
///
/// An explicit value that fails to parse is an error; it never falls
/// through to the next source.
///
/// # Errors
/// The parse error of the first explicit value, or `ScopeError::Missing`.
pub fn resolve_scope(
    flag: Option<&str>,
    default_repo: Option<&str>,
    git_origin: impl FnOnce() -> Option<Scope>,
) -> std::result::Result<Scope, ScopeError> {
    if let Some(raw) = flag.or(default_repo) {
        return Scope::parse(raw);
    }
    git_origin().ok_or(ScopeError::Missing)
}

/// Find an API token for the host behind `api_url`
///
/// Environment variables are checked first (`GH_TOKEN`/`GITHUB_TOKEN` for
/// github.com, the `*_ENTERPRISE_TOKEN` pair for other hosts), then the
/// credential managed by `gh`.
pub fn resolve_token(
    api_url: &str,
    env: impl Fn(&str) -> Option<String>,
    gh: impl FnOnce(&str) -> Option<String>,
) -> Option<String> {
    let host = host_for_api_url(api_url);
    let vars = if host == "github.com" {
        GITHUB_TOKEN_VARS
    } else {
        ENTERPRISE_TOKEN_VARS
    };
    vars.iter()
        .filter_map(|var| env(*var))
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
        .or_else(|| gh(&host))
}

/// Hostname `gh` knows the API root by
///
/// `https://api.github.com` maps to `github.com`; an Enterprise root such as
/// `https://ghe.example.com/api/v3` maps to its own host.
#[must_use]
pub fn host_for_api_url(api_url: &str) -> String {
    if api_url.trim_end_matches('/') == DEFAULT_API_URL {
        return "github.com".to_string();
    }
    let rest = api_url.split_once("://").map_or(api_url, |(_, r)| r);
    let host = rest.split(['/', ':']).next().unwrap_or(rest);
    host.strip_prefix("api.").unwrap_or(host).to_string()
}

fn gh_auth_token(host: &str) -> Option<String> {
    let output = Command::new("gh")
        .args(["auth", "token", "--hostname", host])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let token = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!token.is_empty()).then_some(token)
}
