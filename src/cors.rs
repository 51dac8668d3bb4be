use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::{options, Request, Response};

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Accept";

/// Adds CORS headers for origins on the allow-list. Requests from other
/// origins get no CORS headers, so browsers refuse the response.
pub struct Cors {
    allowed_origins: Vec<String>,
}

impl Cors {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Cors { allowed_origins }
    }

    fn allows(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS allow-list",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let origin = match req.headers().get_one("Origin") {
            Some(origin) if self.allows(origin) => origin.to_string(),
            _ => return,
        };
        res.set_header(Header::new("Access-Control-Allow-Origin", origin));
        res.set_header(Header::new("Access-Control-Allow-Methods", ALLOWED_METHODS));
        res.set_header(Header::new("Access-Control-Allow-Headers", ALLOWED_HEADERS));
        res.set_header(Header::new("Vary", "Origin"));
    }
}

// Answers every preflight; the fairing decides whether it carries CORS headers
#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}
