//! Argument sets handed to handlers and middleware.

use crate::http::{Request, Response};
use crate::inject::Value;

/// What a declared parameter was bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Request,
    Response,
    Value(Value),
}

/// Arguments assembled for one handler or middleware invocation.
///
/// Parameters are kept in declaration order. The shared request and response
/// are only reachable when the callable declared a parameter of that type.
#[derive(Debug)]
pub struct CallArgs<'a> {
    request: &'a Request,
    response: &'a mut Response,
    bound: Vec<(String, Bound)>,
}

impl<'a> CallArgs<'a> {
    pub(crate) fn new(request: &'a Request, response: &'a mut Response) -> Self {
        Self {
            request,
            response,
            bound: Vec::new(),
        }
    }

    pub(crate) fn bind(&mut self, name: impl Into<String>, bound: Bound) {
        self.bound.push((name.into(), bound));
    }

    fn has(&self, wanted: &Bound) -> bool {
        self.bound.iter().any(|(_, b)| b == wanted)
    }

    /// The shared request, if a request parameter was declared.
    pub fn request(&self) -> Option<&Request> {
        self.has(&Bound::Request).then_some(self.request)
    }

    /// The shared response, if a response parameter was declared.
    pub fn response(&mut self) -> Option<&mut Response> {
        if self.has(&Bound::Response) {
            Some(&mut *self.response)
        } else {
            None
        }
    }

    /// What the named parameter was bound to.
    pub fn binding(&self, name: &str) -> Option<&Bound> {
        self.bound.iter().find(|(n, _)| n == name).map(|(_, b)| b)
    }

    /// Value bound to the named parameter; `None` when unresolved.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.binding(name) {
            Some(Bound::Value(value)) if !value.is_null() => Some(value),
            _ => None,
        }
    }

    /// Value bound at a parameter position; `None` when unresolved.
    pub fn positional(&self, index: usize) -> Option<&Value> {
        match self.bound.get(index) {
            Some((_, Bound::Value(value))) if !value.is_null() => Some(value),
            _ => None,
        }
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Declared parameter names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bound.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    #[test]
    fn test_request_only_when_declared() {
        let req = Request::new(Method::Get, "/");
        let mut res = Response::new();
        let mut args = CallArgs::new(&req, &mut res);
        args.bind("id", Bound::Value(Value::Int(3)));
        assert!(args.request().is_none());
        assert!(args.response().is_none());

        args.bind("request", Bound::Request);
        args.bind("response", Bound::Response);
        assert_eq!(args.request().map(Request::path), Some("/"));
        args.response().unwrap().status(204, "No Content");
        assert_eq!(res.status_code(), 204);
    }

    #[test]
    fn test_null_reads_as_absent() {
        let req = Request::new(Method::Get, "/");
        let mut res = Response::new();
        let mut args = CallArgs::new(&req, &mut res);
        args.bind("missing", Bound::Value(Value::Null));
        args.bind("name", Bound::Value("ana".into()));
        assert!(args.get("missing").is_none());
        assert_eq!(args.binding("missing"), Some(&Bound::Value(Value::Null)));
        assert_eq!(args.positional(1), Some(&Value::Str("ana".into())));
        assert_eq!(args.names().collect::<Vec<_>>(), vec!["missing", "name"]);
    }
}
