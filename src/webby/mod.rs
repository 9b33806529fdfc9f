use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Method;
use rocket::{Request, Response};

/// Adds CORS headers for a fixed list of trusted origins.
pub struct Cors {
    pub allow_origins: Vec<String>,
    pub allow_methods: &'static [&'static str],
    // ingress allowed user-set headers
    pub allow_headers: &'static [&'static str],
    // egress allowed user-viewable headers
    pub expose_headers: &'static [&'static str],
}

impl Cors {
    pub fn new(allow_origins: Vec<String>) -> Cors {
        Cors {
            allow_origins,
            allow_methods: &["GET", "POST", "PUT", "DELETE"],
            allow_headers: &["Content-Type"],
            expose_headers: &["Location"],
        }
    }

    fn allowed_origin<'a>(&self, req: &'a Request<'_>) -> Option<&'a str> {
        let origin = req.headers().get_one("Origin")?;
        self.allow_origins.iter().any(|o| o == origin).then_some(origin)
    }
}

fn is_preflight(req: &Request<'_>) -> bool {
    req.method() == Method::Options && req.headers().contains("Access-Control-Request-Method")
}

fn set_headers_actual(conf: &Cors, res: &mut Response<'_>) {
    if !conf.expose_headers.is_empty() {
        res.set_raw_header("Access-Control-Expose-Headers", conf.expose_headers.join(", "));
    }
}

fn set_headers_preflight(conf: &Cors, req: &Request<'_>, res: &mut Response<'_>) {
    let requested = req.headers().get_one("Access-Control-Request-Method").unwrap_or("");
    if !conf.allow_methods.iter().any(|&m| m.eq_ignore_ascii_case(requested)) {
        return;
    }
    res.set_raw_header("Access-Control-Allow-Methods", conf.allow_methods.join(", "));
    if !conf.allow_headers.is_empty() {
        res.set_raw_header("Access-Control-Allow-Headers", conf.allow_headers.join(", "));
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let origin = match self.allowed_origin(req) {
            Some(origin) => origin.to_owned(),
            None => return,
        };

        if is_preflight(req) {
            set_headers_preflight(self, req, res);
        } else {
            set_headers_actual(self, res);
        }
        res.set_raw_header("Access-Control-Allow-Origin", origin);
        res.set_raw_header("Vary", "Origin");
    }
}
