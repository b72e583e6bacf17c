use anyhow::{Result, bail};
use taller_application::Console;
use taller_core::session::{Credentials, Identity};

use crate::AuthArgs;

/// Restores the server session, or logs in with the given credentials.
pub async fn connect(console: &Console, auth: &AuthArgs) -> Result<Identity> {
    if let Some(identity) = console.start().await? {
        return Ok(identity);
    }

    let (Some(username), Some(password)) = (&auth.username, &auth.password) else {
        bail!("Not logged in: pass --username and --password (or TALLER_USERNAME / TALLER_PASSWORD)");
    };
    let identity = console
        .login(&Credentials::new(username.as_str(), password.as_str()))
        .await?;
    tracing::info!("[cli] Logged in as {}", identity.display_name);
    Ok(identity)
}

pub fn whoami(identity: &Identity) {
    println!("{} (id {}, {})", identity.display_name, identity.id, identity.role);
}

pub async fn logout(console: &Console) -> Result<()> {
    console.logout().await?;
    println!("Session closed");
    Ok(())
}
