use chrono::{Duration, Utc};
use marketplace_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        events::{ActiveModel as EventActive, Column as EventCol, Entity as Events},
        services::{ActiveModel as ServiceActive, Column as ServiceCol, Entity as Services},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    middleware::auth::Role,
    services::auth_service::hash_password,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let provider_id = ensure_user(&orm, "prestador@example.com", "prestador123", "Ana Prestadora", Role::Provider).await?;
    let purchaser_id = ensure_user(&orm, "cliente@example.com", "cliente123", "Bruno Cliente", Role::Purchaser).await?;
    seed_events(&orm, provider_id).await?;
    seed_services(&orm, provider_id).await?;

    println!("Seed completed. Provider ID: {provider_id}, Purchaser ID: {purchaser_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    full_name: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find().filter(UserCol::Email.eq(email)).one(orm).await? {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        full_name: Set(Some(full_name.to_string())),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user.id)
}

async fn seed_events(orm: &DatabaseConnection, owner: Uuid) -> anyhow::Result<()> {
    let events = vec![
        ("Feira de Artesanato", 3, "Praça Central", "Artesãos da região"),
        ("Show na Praça", 5, "Praça da Matriz", "Música ao vivo com bandas locais"),
        ("Corrida Solidária", 9, "Parque Municipal", "5 km com doação de alimentos"),
    ];

    for (name, days_ahead, location, description) in events {
        let exists = Events::find().filter(EventCol::Name.eq(name)).one(orm).await?;
        if exists.is_some() {
            continue;
        }
        EventActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(owner),
            name: Set(name.to_string()),
            event_date: Set((Utc::now() + Duration::days(days_ahead)).into()),
            location: Set(location.to_string()),
            description: Set(Some(description.to_string())),
            responsible: Set("Ana Prestadora".to_string()),
            contact: Set("(11) 99999-0000".to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded events");
    Ok(())
}

async fn seed_services(orm: &DatabaseConnection, owner: Uuid) -> anyhow::Result<()> {
    let services = vec![
        ("Buffet Completo", "Buffet para festas de até 50 pessoas", Some(150_000)),
        ("Fotografia de Eventos", "Cobertura fotográfica com 200 fotos editadas", Some(80_000)),
        ("DJ", "Som e iluminação para 4 horas", Some(60_000)),
        ("Decoração", "Orçamento sob consulta", None),
    ];

    for (name, description, price_cents) in services {
        let exists = Services::find().filter(ServiceCol::Name.eq(name)).one(orm).await?;
        if exists.is_some() {
            continue;
        }
        ServiceActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(owner),
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            price_cents: Set(price_cents),
            responsible: Set("Ana Prestadora".to_string()),
            contact: Set("(11) 99999-0000".to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded services");
    Ok(())
}
