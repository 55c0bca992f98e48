//! Session gate: which screen a route shows for the current credential.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Root,
    Upload,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Upload => "/upload",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Workflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub route: Route,
    pub screen: Screen,
    pub redirected: bool,
}

/// The root shows the auth screen only while signed out; `/upload` shows the
/// workflow only while signed in. Anything else redirects.
pub fn resolve(requested: Route, has_credential: bool) -> Resolution {
    let route = if has_credential {
        Route::Upload
    } else {
        Route::Root
    };
    let screen = if has_credential {
        Screen::Workflow
    } else {
        Screen::Auth
    };
    Resolution {
        route,
        screen,
        redirected: route != requested,
    }
}
