use crate::config::Config;
use crate::domain::Role;
use crate::services::CreateUser;
use crate::state::SharedState;

pub async fn cmd_init_db(config: Config) -> anyhow::Result<()> {
    println!("Initializing database...");

    let bootstrap = config.bootstrap.clone();
    let state = SharedState::new(config).await?;

    let created = state
        .user_service
        .ensure_user(CreateUser {
            username: bootstrap.admin_username.clone(),
            email: bootstrap.admin_email.clone(),
            password: bootstrap.admin_password,
            role: Some(Role::Admin),
        })
        .await?;

    if created {
        println!("✓ Admin user created");
        println!("   Username: {}", bootstrap.admin_username);
        println!("   Email:    {}", bootstrap.admin_email);
        println!("   Change the bootstrap password before exposing the API.");
    } else {
        println!(
            "Admin user '{}' already exists, nothing to do",
            bootstrap.admin_username
        );
    }

    println!("Done!");
    Ok(())
}

pub async fn cmd_create_admin(
    config: Config,
    username: String,
    email: String,
    password: String,
) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    let user = state
        .user_service
        .create_user(CreateUser {
            username,
            email,
            password,
            role: Some(Role::Admin),
        })
        .await?;

    println!("✓ Admin '{}' created (id {})", user.username, user.id);
    Ok(())
}
