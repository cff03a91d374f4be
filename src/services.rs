// Módulos de decisão puros (precificação, moderação, atribuição) e os
// serviços que os orquestram sobre o banco.
pub mod pricing;
pub mod moderation;
pub mod revenue;

pub mod course_service;
pub use course_service::CourseService;
pub mod bundle_service;
pub use bundle_service::BundleService;
pub mod order_service;
pub use order_service::OrderService;
pub mod company_service;
pub use company_service::CompanyService;
pub mod analytics_service;
pub use analytics_service::AnalyticsService;
