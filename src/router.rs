/// Every screen the client can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    ForgotPassword,
    ResetPassword(String),
    Dashboard,
    MyDiary,
    CloseCircle,
    Everyone,
    Notifications,
    Profile,
    PublicProfile(String),
}

impl Route {
    /// Parse a route path. Unknown paths land on the dashboard; `/` lands on
    /// the login screen and is redirected by [`resolve`] when signed in.
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim().trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match segments.as_slice() {
            [] | ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["forgot-password"] => Route::ForgotPassword,
            ["reset-password", token] => Route::ResetPassword(token.to_string()),
            ["dashboard"] => Route::Dashboard,
            ["my-diary"] => Route::MyDiary,
            ["close-circle"] => Route::CloseCircle,
            ["everyone"] => Route::Everyone,
            ["notifications"] => Route::Notifications,
            ["me"] => Route::Profile,
            ["public", user_id] => Route::PublicProfile(user_id.to_string()),
            _ => Route::Dashboard,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword(token) => format!("/reset-password/{}", token),
            Route::Dashboard => "/dashboard".to_string(),
            Route::MyDiary => "/my-diary".to_string(),
            Route::CloseCircle => "/close-circle".to_string(),
            Route::Everyone => "/everyone".to_string(),
            Route::Notifications => "/notifications".to_string(),
            Route::Profile => "/me".to_string(),
            Route::PublicProfile(id) => format!("/public/{}", id),
        }
    }

    /// Screens reachable without a token.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Login | Route::Signup | Route::ForgotPassword | Route::ResetPassword(_)
        )
    }
}

/// Apply the auth redirects: signed-in users never see login/signup, and
/// signed-out users never see the app shell. Password recovery stays
/// reachable either way.
pub fn resolve(route: Route, authenticated: bool) -> Route {
    match route {
        Route::Login | Route::Signup if authenticated => Route::Dashboard,
        route if !authenticated && !route.is_public() => Route::Login,
        route => route,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths() {
        assert_eq!(Route::parse("/"), Route::Login);
        assert_eq!(Route::parse("/my-diary"), Route::MyDiary);
        assert_eq!(Route::parse("/me/"), Route::Profile);
        assert_eq!(
            Route::parse("/public/64f0aa"),
            Route::PublicProfile("64f0aa".to_string())
        );
        assert_eq!(
            Route::parse("/reset-password/tok123"),
            Route::ResetPassword("tok123".to_string())
        );
        assert_eq!(Route::parse("/nowhere/at/all"), Route::Dashboard);
    }

    #[test]
    fn test_path_inverts_parse() {
        for route in [
            Route::Signup,
            Route::CloseCircle,
            Route::Everyone,
            Route::Notifications,
            Route::PublicProfile("abc".to_string()),
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_redirects() {
        assert_eq!(resolve(Route::Login, true), Route::Dashboard);
        assert_eq!(resolve(Route::Signup, true), Route::Dashboard);
        assert_eq!(resolve(Route::MyDiary, false), Route::Login);
        assert_eq!(
            resolve(Route::PublicProfile("x".into()), false),
            Route::Login
        );
        assert_eq!(resolve(Route::ForgotPassword, true), Route::ForgotPassword);
        assert_eq!(resolve(Route::Everyone, true), Route::Everyone);
    }
}
