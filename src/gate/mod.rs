//! Session/role gate: who is asking, and may they see this page.
//!
//! The role is always read from the stored user record. Tokens and the demo
//! header only carry an identity, and the demo header never grants admin.

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Role, User};
use crate::store::{Store, StoreError};

pub const DEMO_PRINCIPAL_HEADER: &str = "x-demo-principal";
pub const DEMO_BANNER: &str = "You are using a demo account. Some features may be limited.";

/// Pages that need a signed-in user with one of the listed roles. Every
/// other page is public.
static PROTECTED_PAGES: &[(&str, &[Role])] = &[
    ("admin.html", &[Role::Admin]),
    ("employer.html", &[Role::Employer]),
    ("create-job.html", &[Role::Employer]),
    ("profile.html", &[Role::Student]),
];

/// Last path segment, which is how pages are keyed
pub fn page_from_path(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or(path)
}

pub fn allowed_roles(page: &str) -> Option<&'static [Role]> {
    PROTECTED_PAGES.iter().find(|(name, _)| *name == page).map(|(_, roles)| *roles)
}

pub fn login_page_for(page: &str) -> &'static str {
    if page.contains("employer") {
        "employer-login.html"
    } else {
        "student-login.html"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalSource {
    Token,
    Demo,
}

/// What the request claims to be, before the store is consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    Token(Uuid),
    Demo(Uuid),
    Anonymous,
}

/// A caller backed by a stored user record
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    pub source: PrincipalSource,
}

impl Principal {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_demo(&self) -> bool {
        self.source == PrincipalSource::Demo
    }

    pub fn chrome(&self) -> Chrome {
        let display_name = self.user.label().to_string();
        let initial = display_name.chars().next().map(|c| c.to_uppercase().to_string()).unwrap_or_default();
        Chrome {
            display_name,
            initial,
            photo_url: self.user.photo_url.clone(),
            demo_banner: self.is_demo().then_some(DEMO_BANNER),
        }
    }
}

/// Header/avatar data every gated page renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chrome {
    pub display_name: String,
    pub initial: String,
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_banner: Option<&'static str>,
}

/// Look up the user behind the credentials. A missing record means anonymous,
/// and so does an admin named only by the demo header.
pub async fn resolve(store: &dyn Store, credentials: Credentials) -> Result<Option<Principal>, StoreError> {
    let (id, source) = match credentials {
        Credentials::Anonymous => return Ok(None),
        Credentials::Token(id) => (id, PrincipalSource::Token),
        Credentials::Demo(id) => (id, PrincipalSource::Demo),
    };

    match store.get_user(id).await? {
        Some(user) if source == PrincipalSource::Demo && user.role == Role::Admin => {
            warn!("Refusing demo principal {} with admin role, treating as anonymous", id);
            Ok(None)
        }
        Some(user) => {
            debug!("Resolved {} principal {} as {}", source_name(source), id, user.role);
            Ok(Some(Principal { user, source }))
        }
        None => {
            warn!("No user record for {} principal {}, treating as anonymous", source_name(source), id);
            Ok(None)
        }
    }
}

fn source_name(source: PrincipalSource) -> &'static str {
    match source {
        PrincipalSource::Token => "token",
        PrincipalSource::Demo => "demo",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub page: String,
    pub role: Option<Role>,
    pub chrome: Option<Chrome>,
}

#[derive(Debug, Clone)]
pub enum GateDecision {
    Allow(PageContext),
    Redirect(&'static str),
}

pub fn decide(page: &str, principal: Option<&Principal>) -> GateDecision {
    if let Some(allowed) = allowed_roles(page) {
        match principal {
            None => return GateDecision::Redirect(login_page_for(page)),
            Some(p) if !allowed.contains(&p.role()) => return GateDecision::Redirect(p.role().home_page()),
            Some(_) => {}
        }
    }

    GateDecision::Allow(PageContext {
        page: page.to_string(),
        role: principal.map(Principal::role),
        chrome: principal.map(Principal::chrome),
    })
}
