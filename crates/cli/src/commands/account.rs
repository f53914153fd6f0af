//! Account commands.

use layercraft_storefront::Storefront;
use layercraft_storefront::models::User;
use tracing::info;

use super::CliError;

/// Create an account, its profile, and log in.
pub async fn signup(
    storefront: &Storefront,
    email: &str,
    password: &str,
    name: &str,
) -> Result<(), CliError> {
    let user = storefront
        .auth()
        .sign_up(email, password, name)
        .await
        .map_err(layercraft_storefront::AppError::from)?;

    info!("Account created");
    print_user(&user);
    Ok(())
}

/// Log in and show who the backend says we are.
pub async fn whoami(storefront: &Storefront, email: &str, password: &str) -> Result<(), CliError> {
    let auth = storefront.auth();
    auth.log_in(email, password)
        .await
        .map_err(layercraft_storefront::AppError::from)?;

    match auth.current_user().await {
        Some(user) => print_user(&user),
        None => info!("No active session"),
    }

    auth.log_out()
        .await
        .map_err(layercraft_storefront::AppError::from)?;
    Ok(())
}

fn print_user(user: &User) {
    info!("{} <{}>", user.name, user.email);
    info!("  ID:   {}", user.id);
    info!("  Role: {}", user.role);
}
