//! Reverse URL generation.

use crate::routing::error::{RouteError, RouteResult};
use crate::routing::pattern::{self, Segment};
use crate::routing::registry::Route;

/// Substitute positional `values` into the route's pattern.
///
/// The n-th value fills the n-th parameter; the value after the last
/// parameter, if present, fills a trailing wildcard. Values are inserted
/// verbatim without escaping.
pub fn build(route: &Route, values: &[&str]) -> RouteResult<String> {
    let parsed = pattern::parse(route.pattern())?;
    let required = parsed
        .segments
        .iter()
        .filter(|s| matches!(s, Segment::Param(_)))
        .count();

    if values.len() < required {
        return Err(RouteError::ParameterCount {
            route: route.label(),
            expected: required,
            supplied: values.len(),
        });
    }

    let capacity = route.pattern().len() + values.iter().map(|v| v.len()).sum::<usize>();
    let mut uri = String::with_capacity(capacity);
    let mut values = values.iter();
    for segment in &parsed.segments {
        match segment {
            Segment::Static(text) => uri.push_str(text),
            Segment::Param(_) | Segment::Wildcard(_) => {
                if let Some(value) = values.next() {
                    uri.push_str(value);
                }
            }
        }
    }
    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::routing::Router;

    fn router_with(pattern: &str) -> Router {
        let mut router = Router::new();
        router
            .add_named(axum::http::Method::GET, pattern, "r", Handler::new(|_| Ok(())), &[])
            .unwrap();
        router
    }

    #[test]
    fn test_build_params_in_order() {
        let router = router_with("/users/:id/posts/:post");
        let route = router.route_by_name("r").unwrap();
        assert_eq!(build(route, &["7", "hello"]).unwrap(), "/users/7/posts/hello");
    }

    #[test]
    fn test_wildcard_value_is_optional() {
        let router = router_with("/users/:id/files/*");
        let route = router.route_by_name("r").unwrap();
        assert_eq!(build(route, &["1"]).unwrap(), "/users/1/files/");
        assert_eq!(build(route, &["1", "a/b.txt"]).unwrap(), "/users/1/files/a/b.txt");
    }

    #[test]
    fn test_missing_param_value() {
        let router = router_with("/users/:id/posts/:post");
        let route = router.route_by_name("r").unwrap();
        let err = build(route, &["7"]).unwrap_err();
        assert_eq!(
            err,
            RouteError::ParameterCount {
                route: "r".into(),
                expected: 2,
                supplied: 1
            }
        );
    }

    #[test]
    fn test_stops_at_first_wildcard() {
        let router = router_with("/a/*/b/*");
        let route = router.route_by_name("r").unwrap();
        assert_eq!(build(route, &["x", "y"]).unwrap(), "/a/x");
    }

    #[test]
    fn test_values_are_not_escaped() {
        let router = router_with("/search/:q");
        let route = router.route_by_name("r").unwrap();
        assert_eq!(build(route, &["a b"]).unwrap(), "/search/a b");
    }
}
