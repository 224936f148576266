//! Login command: exchange credentials for a session token.

use std::rc::Rc;

use anyhow::bail;

use dms_core::auth::{LoginType, TokenStore};
use dms_core::client::HttpGateway;
use dms_session::{MemoryTokenStore, Session};

/// Log in and print the session token, for reuse via `--token`.
pub async fn run_login(
    base_url: &str,
    id: &str,
    password: &str,
    phone: bool,
) -> anyhow::Result<()> {
    let tokens: Rc<MemoryTokenStore> = Rc::new(MemoryTokenStore::default());
    let gateway = HttpGateway::new(base_url, Rc::clone(&tokens) as Rc<dyn TokenStore>);
    let session = Session::new(tokens as Rc<dyn TokenStore>);

    let login_type = if phone {
        LoginType::Phone
    } else {
        LoginType::Username
    };
    if session.login(&gateway, login_type, id, password).await {
        match session.token() {
            Some(token) => {
                println!("{token}");
                Ok(())
            }
            None => bail!("login succeeded but no token was stored"),
        }
    } else {
        bail!(
            "login failed: {}",
            session
                .last_error()
                .unwrap_or_else(|| "unknown error".to_string())
        )
    }
}
