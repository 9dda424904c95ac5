use hyper::{
    header::{self, HeaderMap, HeaderValue},
    Body, Method, Response, StatusCode,
};

/// Request headers a preflight is allowed to announce.
#[derive(Clone, Debug, PartialEq)]
pub enum AllowHeaders {
    /// Echo `Access-Control-Request-Headers` back as-is.
    Mirror,
    List(Vec<String>),
}

/// CORS policy applied to every response
#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allow_methods: Vec<Method>,
    pub allow_headers: AllowHeaders,
    pub allow_credentials: bool,
    pub max_age: Option<u64>,
}

impl CorsConfig {
    /// Any origin and any request header, on the methods the server serves.
    ///
    /// Credentialed requests do not treat `*` as a wildcard, so origin and
    /// headers are echoed instead.
    pub fn permissive() -> Self {
        Self {
            allow_methods: vec![Method::GET, Method::OPTIONS],
            allow_headers: AllowHeaders::Mirror,
            allow_credentials: true,
            max_age: Some(600),
        }
    }

    /// An `OPTIONS` request announcing the method it wants to send.
    pub fn is_preflight(method: &Method, request_headers: &HeaderMap) -> bool {
        *method == Method::OPTIONS
            && request_headers.contains_key(header::ORIGIN)
            && request_headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
    }

    /// Answer to a preflight request, including the origin headers.
    pub fn preflight(&self, request_headers: &HeaderMap) -> Response<Body> {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;

        let headers = response.headers_mut();
        let methods = self
            .allow_methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(methods) = HeaderValue::from_str(&methods) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, methods);
        }

        match &self.allow_headers {
            AllowHeaders::Mirror => {
                if let Some(requested) =
                    request_headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS)
                {
                    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
                }
                headers.append(
                    header::VARY,
                    HeaderValue::from_static("Access-Control-Request-Headers"),
                );
            }
            AllowHeaders::List(names) if !names.is_empty() => {
                if let Ok(names) = HeaderValue::from_str(&names.join(", ")) {
                    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, names);
                }
            }
            AllowHeaders::List(_) => {}
        }

        if let Some(max_age) = self.max_age {
            headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age));
        }

        self.allow_origin(headers, request_headers.get(header::ORIGIN));
        response
    }

    pub fn apply(&self, response: &mut Response<Body>, origin: Option<&HeaderValue>) {
        self.allow_origin(response.headers_mut(), origin);
    }

    fn allow_origin(&self, headers: &mut HeaderMap, origin: Option<&HeaderValue>) {
        // a wildcard origin is ignored by browsers on credentialed requests
        let allow_origin = match origin {
            Some(origin) if self.allow_credentials => origin.clone(),
            _ => HeaderValue::from_static("*"),
        };
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);

        if self.allow_credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
            headers.append(header::VARY, HeaderValue::from_static("Origin"));
        }
    }
}
