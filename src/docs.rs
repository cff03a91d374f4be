// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Courses ---
        handlers::courses::create_course,
        handlers::courses::list_courses,
        handlers::courses::list_my_courses,
        handlers::courses::get_course,
        handlers::courses::add_lesson,
        handlers::courses::issue_certificate,

        // --- Moderation ---
        handlers::courses::submit_course,
        handlers::courses::approve_course,
        handlers::courses::reject_course,
        handlers::courses::unpublish_course,
        handlers::courses::archive_course,
        handlers::courses::delete_course,

        // --- Bundles ---
        handlers::bundles::create_bundle,
        handlers::bundles::update_bundle,
        handlers::bundles::list_bundles,
        handlers::bundles::get_bundle,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::confirm_payment,
        handlers::orders::refund_payment,
        handlers::orders::fail_payment,

        // --- Companies ---
        handlers::companies::create_company,
        handlers::companies::get_company,
        handlers::companies::create_invitation,
        handlers::companies::accept_invitation,
        handlers::companies::remove_member,

        // --- Analytics ---
        handlers::analytics::revenue_report,
        handlers::analytics::overview,
    ),
    components(
        schemas(
            // --- Catalog ---
            models::catalog::CourseStatus,
            models::catalog::Course,
            models::catalog::Lesson,

            // --- Commerce ---
            models::commerce::PaymentStatus,
            models::commerce::Bundle,
            models::commerce::BundleDetail,
            models::commerce::Order,
            models::commerce::OrderItem,
            models::commerce::Payment,
            models::commerce::Enrollment,
            models::commerce::Certificate,

            // --- Companies ---
            models::company::Company,
            models::company::CompanyInvitation,
            models::company::CompanyMember,

            // --- Analytics ---
            models::analytics::CourseRevenueEntry,
            models::analytics::RevenueReport,
            models::analytics::MonthBucket,
            models::analytics::AnalyticsOverview,

            // --- Payloads ---
            handlers::courses::CreateCoursePayload,
            handlers::courses::AddLessonPayload,
            handlers::courses::RejectCoursePayload,
            handlers::bundles::BundlePayload,
            handlers::orders::OrderItemPayload,
            handlers::orders::CreateOrderPayload,
            handlers::orders::CheckoutResponse,
            handlers::companies::CreateCompanyPayload,
            handlers::companies::CreateInvitationPayload,
            handlers::companies::AcceptInvitationPayload,
        )
    ),
    tags(
        (name = "Courses", description = "Catálogo de Cursos e Aulas"),
        (name = "Moderation", description = "Ciclo Editorial do Curso"),
        (name = "Bundles", description = "Pacotes com Desconto"),
        (name = "Orders", description = "Pedidos e Pagamentos"),
        (name = "Companies", description = "Planos Corporativos e Assentos"),
        (name = "Analytics", description = "Receita e Indicadores Mensais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
