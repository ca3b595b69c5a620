//! Scenario-based testing with mandatory oracle verification.
//!
//! A scenario scripts one guest's whole interaction (redirect firings,
//! exchange outcome, fetch snapshots, channel events), runs it through
//! the real [`tableside_app::Runtime`], and hands the final [`World`] to
//! an oracle. A scenario without an oracle cannot be run.

mod builder;
mod world;

pub use builder::{RunnableScenario, Scenario};
pub use world::World;

/// Oracle verifying the final world state.
pub type OracleFn = Box<dyn Fn(&World) -> Result<(), String> + Send>;

/// Build an access token whose claims segment carries `role`.
///
/// Shape matches what the issuing authority redirects to the client:
/// dot-separated segments with unpadded base64url JSON claims. The
/// signature segment is garbage; nothing client-side verifies it.
#[must_use]
pub fn access_token_for(role: &str) -> String {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"role":"{role}"}}"#).as_bytes());
    format!("{header}.{claims}.unverified")
}
