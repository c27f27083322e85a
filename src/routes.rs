//! View routing and the authentication guard.
//!
//! The route tree mirrors the service's views: public sign-in/sign-up,
//! and guarded hobby, profile and warehouse views. Entering a guarded
//! route without a signed-in session redirects to sign-in and remembers
//! where the user was headed, so a successful sign-in can return there.

use crate::auth::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    SignIn,
    SignUp,
    Hobbies,
    Hobby(i64),
    Profile,
    Warehouses,
    WarehouseStocks(i64),
}

impl Route {
    /// Path for display and logs.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::SignIn => "/auth/signin".to_string(),
            Route::SignUp => "/auth/signup".to_string(),
            Route::Hobbies => "/hobbies".to_string(),
            Route::Hobby(id) => format!("/hobbies/{}", id),
            Route::Profile => "/me".to_string(),
            Route::Warehouses => "/warehouses".to_string(),
            Route::WarehouseStocks(id) => format!("/warehouses/{}/stocks", id),
        }
    }

    pub fn requires_auth(&self) -> bool {
        match self {
            Route::Home | Route::SignIn | Route::SignUp => false,
            Route::Hobbies
            | Route::Hobby(_)
            | Route::Profile
            | Route::Warehouses
            | Route::WarehouseStocks(_) => true,
        }
    }
}

/// Guard predicate: a view behind the guard is reachable iff the profile
/// id is populated.
pub fn can_enter(session: &Session) -> bool {
    session.user_profile_id != 0
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allowed(Route),
    RedirectToSignIn { from: Route },
}

/// Tracks the current view and the post-sign-in return destination.
#[derive(Debug, Default)]
pub struct Router {
    current: Option<Route>,
    return_to: Option<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            current: Some(Route::Home),
            return_to: None,
        }
    }

    pub fn current(&self) -> Route {
        self.current.unwrap_or(Route::Home)
    }

    /// Attempt to enter a route. A guarded route with no session redirects
    /// to sign-in, remembering the refused destination.
    pub fn navigate(&mut self, to: Route, session: &Session) -> Navigation {
        if to.requires_auth() && !can_enter(session) {
            self.return_to = Some(to);
            self.current = Some(Route::SignIn);
            return Navigation::RedirectToSignIn { from: to };
        }
        self.current = Some(to);
        Navigation::Allowed(to)
    }

    /// Where to land after a successful sign-in: the remembered refused
    /// destination, or the profile by default.
    pub fn complete_sign_in(&mut self) -> Route {
        let destination = self.return_to.take().unwrap_or(Route::Profile);
        self.current = Some(destination);
        destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> Session {
        Session {
            user_id: 7,
            user_profile_id: 12,
            username: "andi".to_string(),
            email: "andi@example.com".to_string(),
        }
    }

    #[test]
    fn test_guard_requires_profile_id() {
        assert!(can_enter(&signed_in()));
        assert!(!can_enter(&Session::default()));

        // A session with a user id but no profile id is still locked out
        let partial = Session {
            user_profile_id: 0,
            ..signed_in()
        };
        assert!(!can_enter(&partial));
    }

    #[test]
    fn test_public_routes_always_reachable() {
        let mut router = Router::new();
        let session = Session::default();
        assert_eq!(
            router.navigate(Route::SignUp, &session),
            Navigation::Allowed(Route::SignUp)
        );
        assert_eq!(router.current(), Route::SignUp);
    }

    #[test]
    fn test_redirect_remembers_destination() {
        let mut router = Router::new();
        let session = Session::default();

        let nav = router.navigate(Route::WarehouseStocks(3), &session);
        assert_eq!(
            nav,
            Navigation::RedirectToSignIn {
                from: Route::WarehouseStocks(3)
            }
        );
        assert_eq!(router.current(), Route::SignIn);

        // Signing in returns to the refused destination
        assert_eq!(router.complete_sign_in(), Route::WarehouseStocks(3));
        assert_eq!(router.current(), Route::WarehouseStocks(3));
    }

    #[test]
    fn test_sign_in_defaults_to_profile() {
        let mut router = Router::new();
        assert_eq!(router.complete_sign_in(), Route::Profile);
    }

    #[test]
    fn test_return_destination_is_one_shot() {
        let mut router = Router::new();
        let session = Session::default();
        router.navigate(Route::Hobbies, &session);

        assert_eq!(router.complete_sign_in(), Route::Hobbies);
        // A second sign-in has nothing remembered
        assert_eq!(router.complete_sign_in(), Route::Profile);
    }

    #[test]
    fn test_guarded_route_with_session() {
        let mut router = Router::new();
        let nav = router.navigate(Route::Profile, &signed_in());
        assert_eq!(nav, Navigation::Allowed(Route::Profile));
    }

    #[test]
    fn test_paths() {
        assert_eq!(Route::Hobby(4).path(), "/hobbies/4");
        assert_eq!(Route::WarehouseStocks(2).path(), "/warehouses/2/stocks");
        assert_eq!(Route::Profile.path(), "/me");
    }
}
