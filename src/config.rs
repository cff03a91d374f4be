// src/config.rs

use chrono::FixedOffset;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        AnalyticsRepository, BundleRepository, CompanyRepository, CourseRepository,
        OrderRepository, UserRepository,
    },
    services::{
        AnalyticsService, BundleService, CompanyService, CourseService, OrderService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub user_repo: UserRepository,
    pub course_service: CourseService,
    pub bundle_service: BundleService,
    pub order_service: OrderService,
    pub company_service: CompanyService,
    pub analytics_service: AnalyticsService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Fuso dos relatórios (ex.: "-03:00"). Padrão: UTC.
        let report_offset: FixedOffset = env::var("REPORT_TZ_OFFSET")
            .unwrap_or_else(|_| "+00:00".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("REPORT_TZ_OFFSET inválido: {e}"))?;

        // Validade dos convites de empresa, em dias.
        let invitation_ttl_days: i64 = env::var("INVITATION_TTL_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("INVITATION_TTL_DAYS inválido: {e}"))?;

        // O acquire_timeout curto garante que nenhuma chamada ao banco fica
        // pendurada: pool esgotada vira erro 503 (retryable), não espera infinita.
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let course_repo = CourseRepository::new(db_pool.clone());
        let bundle_repo = BundleRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let analytics_repo = AnalyticsRepository::new(db_pool.clone());

        let course_service = CourseService::new(course_repo.clone());
        let bundle_service = BundleService::new(bundle_repo.clone());
        let order_service = OrderService::new(order_repo, course_repo, bundle_repo);
        let company_service = CompanyService::new(company_repo, invitation_ttl_days);
        let analytics_service = AnalyticsService::new(analytics_repo, report_offset);

        Ok(Self {
            db_pool,
            jwt_secret,
            user_repo,
            course_service,
            bundle_service,
            order_service,
            company_service,
            analytics_service,
        })
    }
}
