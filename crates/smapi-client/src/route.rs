//! Declarative description of one API operation's HTTP shape
//!
//! A route is built by the operation, consumed once by `RequestBuilder`, and
//! never shared. Parameter order is preserved as declared.

use transport::Method;

use crate::error::RequestError;
use crate::pagination::PageRequest;

/// A query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Scalar(String),
    /// Emitted as one `key=value` pair per element, never comma-joined
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct RouteDescriptor<B = ()> {
    method: Method,
    template: String,
    /// Declared path parameters; `None` is an optional parameter left unset
    path_params: Vec<(String, Option<String>)>,
    query: Vec<(String, QueryValue)>,
    headers: Vec<(String, String)>,
    body: Option<B>,
}

impl RouteDescriptor<()> {
    pub fn new(method: Method, template: impl Into<String>) -> Self {
        Self {
            method,
            template: template.into(),
            path_params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(template: impl Into<String>) -> Self {
        Self::new(Method::GET, template)
    }

    pub fn post(template: impl Into<String>) -> Self {
        Self::new(Method::POST, template)
    }

    pub fn put(template: impl Into<String>) -> Self {
        Self::new(Method::PUT, template)
    }

    pub fn delete(template: impl Into<String>) -> Self {
        Self::new(Method::DELETE, template)
    }
}

impl<B> RouteDescriptor<B> {
    pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.path_params
            .push((name.into(), Some(value.to_string())));
        self
    }

    /// Declare a path parameter that may be unset; building fails if it is
    /// unset and its placeholder is present.
    pub fn optional_path_param(
        mut self,
        name: impl Into<String>,
        value: Option<impl ToString>,
    ) -> Self {
        self.path_params
            .push((name.into(), value.map(|v| v.to_string())));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query
            .push((key.into(), QueryValue::Scalar(value.to_string())));
        self
    }

    /// Add a scalar query parameter only when `value` is set.
    pub fn optional_query(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Add a repeated query parameter. An empty list emits nothing.
    pub fn query_list<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        if !values.is_empty() {
            self.query.push((key.into(), QueryValue::List(values)));
        }
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn optional_header(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.header(name, v),
            None => self,
        }
    }

    /// Conditional update: send `If-Match` when an entity tag is given.
    pub fn if_match(self, etag: Option<&str>) -> Self {
        self.optional_header("If-Match", etag)
    }

    /// Append `nextToken` / `maxResults` when set.
    pub fn page(self, page: &PageRequest) -> Self {
        self.optional_query("nextToken", page.next_token.as_deref())
            .optional_query("maxResults", page.max_results)
    }

    /// Attach a request body, serialized as JSON when the request is built.
    pub fn body<T>(self, body: T) -> RouteDescriptor<T> {
        RouteDescriptor {
            method: self.method,
            template: self.template,
            path_params: self.path_params,
            query: self.query,
            headers: self.headers,
            body: Some(body),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub(crate) fn take_body(&mut self) -> Option<B> {
        self.body.take()
    }

    /// Query pairs in declaration order, lists expanded element by element.
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.query {
            match value {
                QueryValue::Scalar(v) => pairs.push((key.as_str(), v.as_str())),
                QueryValue::List(values) => {
                    pairs.extend(values.iter().map(|v| (key.as_str(), v.as_str())));
                }
            }
        }
        pairs
    }

    /// Substitute every `{name}` placeholder with its URL-escaped value.
    ///
    /// Each declared path parameter must own exactly one placeholder and every
    /// placeholder must resolve to a set parameter.
    pub fn resolve_path(&self) -> Result<String, RequestError> {
        let template = self.template.as_str();
        let mut path = String::with_capacity(template.len());
        let mut used: Vec<&str> = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find(['{', '}']) {
            if rest.as_bytes()[open] == b'}' {
                return Err(RequestError(format!(
                    "unbalanced `}}` in path template `{template}`"
                )));
            }
            path.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                RequestError(format!("unterminated placeholder in path template `{template}`"))
            })?;
            let name = &after[..close];
            if name.is_empty() || name.contains('{') {
                return Err(RequestError(format!(
                    "malformed placeholder in path template `{template}`"
                )));
            }
            if used.contains(&name) {
                return Err(RequestError(format!(
                    "path parameter `{name}` appears more than once in `{template}`"
                )));
            }

            let value = self
                .path_params
                .iter()
                .find(|(declared, _)| declared == name)
                .and_then(|(_, value)| value.as_deref())
                .ok_or_else(|| {
                    RequestError(format!("missing required path parameter `{name}`"))
                })?;
            // Url::parse collapses dot segments, so these would leave the placeholder
            if matches!(value, "" | "." | "..") {
                return Err(RequestError(format!(
                    "path parameter `{name}` must not be empty, `.` or `..`"
                )));
            }
            path.push_str(&urlencoding::encode(value));
            used.push(name);
            rest = &after[close + 1..];
        }
        path.push_str(rest);

        if let Some((name, _)) = self
            .path_params
            .iter()
            .find(|(declared, _)| !used.contains(&declared.as_str()))
        {
            return Err(RequestError(format!(
                "path parameter `{name}` has no placeholder in `{template}`"
            )));
        }

        Ok(path)
    }
}
