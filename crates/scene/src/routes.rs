/// Client-rendered views, each addressable on its own path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Map,
    Weather,
}

impl Route {
    /// Sidebar order.
    pub const MENU: [Route; 3] = [Route::Home, Route::Map, Route::Weather];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Map => "/mapa",
            Route::Weather => "/clima",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Map => "Satellite",
            Route::Weather => "Weather",
        }
    }

    /// Matches a location path; trailing slashes and query strings are ignored.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        Self::MENU
            .into_iter()
            .find(|r| r.path().trim_end_matches('/') == trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::Route;

    #[test]
    fn resolves_paths_with_and_without_trailing_slash() {
        assert_eq!(Route::from_path("/"), Some(Route::Home));
        assert_eq!(Route::from_path(""), Some(Route::Home));
        assert_eq!(Route::from_path("/mapa/"), Some(Route::Map));
        assert_eq!(Route::from_path("/clima?x=1"), Some(Route::Weather));
        assert_eq!(Route::from_path("/admin"), None);
    }

    #[test]
    fn menu_paths_are_unique() {
        for (i, a) in Route::MENU.iter().enumerate() {
            for b in &Route::MENU[i + 1..] {
                assert_ne!(a.path(), b.path());
            }
        }
    }
}
