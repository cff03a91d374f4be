// src/services/analytics_service.rs

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeDelta, Utc};
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::AnalyticsRepository,
    models::analytics::{AnalyticsOverview, CourseRevenueEntry, MonthBucket, RevenueReport},
    models::commerce::PaymentStatus,
    services::revenue,
};

// Janela fixa do painel: 6 meses-calendário, mês corrente incluído.
pub const REPORT_MONTHS: i32 = 6;

// ---
// Bucketização pura
// ---
// Cada evento cai no mês do SEU timestamp, deslocado para o fuso
// configurado do serviço — nunca no momento da agregação. A série devolvida
// é sempre densa (mês sem evento vale 0) e em ordem cronológica crescente.

fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

fn month_label(index: i32) -> String {
    format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
}

fn local_month_index(ts: DateTime<Utc>, offset: FixedOffset) -> i32 {
    month_index(ts.with_timezone(&offset).date_naive())
}

/// Rótulos "YYYY-MM" da janela, do mais antigo ao mês corrente.
pub fn trailing_month_labels(now: DateTime<Utc>, offset: FixedOffset) -> Vec<String> {
    let current = local_month_index(now, offset);
    (current - (REPORT_MONTHS - 1)..=current)
        .map(month_label)
        .collect()
}

/// Primeiro instante (UTC) do mês mais antigo da janela, para cortar as
/// consultas de eventos no banco.
pub fn window_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let oldest = local_month_index(now, offset) - (REPORT_MONTHS - 1);
    let (year, month0) = (oldest.div_euclid(12), oldest.rem_euclid(12) as u32);
    let first_day = NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default();
    // Meia-noite local -> UTC: subtrai o deslocamento do fuso.
    DateTime::<Utc>::from_naive_utc_and_offset(
        first_day - TimeDelta::seconds(offset.local_minus_utc() as i64),
        Utc,
    )
}

/// Agrega eventos (timestamp, valor) na janela de 6 meses.
/// Eventos fora da janela são ignorados.
pub fn bucket_monthly(
    events: impl IntoIterator<Item = (DateTime<Utc>, i64)>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<MonthBucket> {
    let current = local_month_index(now, offset);
    let oldest = current - (REPORT_MONTHS - 1);

    let mut values = [0i64; REPORT_MONTHS as usize];
    for (ts, value) in events {
        let index = local_month_index(ts, offset);
        if (oldest..=current).contains(&index) {
            values[(index - oldest) as usize] += value;
        }
    }

    values
        .iter()
        .enumerate()
        .map(|(i, value)| MonthBucket {
            month: month_label(oldest + i as i32),
            value: *value,
        })
        .collect()
}

// ---
// Serviço
// ---

#[derive(Clone)]
pub struct AnalyticsService {
    repo: AnalyticsRepository,
    report_offset: FixedOffset,
}

impl AnalyticsService {
    pub fn new(repo: AnalyticsRepository, report_offset: FixedOffset) -> Self {
        Self {
            repo,
            report_offset,
        }
    }

    /// Receita atribuída por curso, com o contador de receita órfã.
    /// Somente leitura; paralelizável sem trava.
    pub async fn revenue_report<'e, E>(&self, executor: E) -> Result<RevenueReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let snapshot = self.repo.fetch_revenue_snapshot(executor).await?;
        let attribution = revenue::attribute_revenue(
            &snapshot.payments,
            &snapshot.order_items,
            &snapshot.bundle_members,
        );

        // Ordena por receita decrescente para uma saída estável.
        let mut courses: Vec<CourseRevenueEntry> = attribution
            .per_course
            .into_iter()
            .map(|(course_id, revenue_cents)| CourseRevenueEntry {
                course_id,
                revenue_cents,
            })
            .collect();
        courses.sort_by(|a, b| {
            b.revenue_cents
                .cmp(&a.revenue_cents)
                .then(a.course_id.cmp(&b.course_id))
        });

        Ok(RevenueReport {
            courses,
            unattributed_cents: attribution.unattributed_cents,
            total_recognized_cents: attribution.total_recognized_cents,
        })
    }

    /// Painel dos últimos 6 meses: receita, cadastros, matrículas e
    /// certificados, tudo numa foto consistente do banco.
    pub async fn overview<'e, E>(&self, executor: E) -> Result<AnalyticsOverview, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let now = Utc::now();
        let since = window_start(now, self.report_offset);

        let mut tx = executor.begin().await?;

        let snapshot = self.repo.fetch_revenue_snapshot(&mut *tx).await?;
        let signups = self.repo.fetch_signup_timestamps(&mut *tx, since).await?;
        let enrollments = self
            .repo
            .fetch_enrollment_timestamps(&mut *tx, since)
            .await?;
        let certificates = self
            .repo
            .fetch_certificate_timestamps(&mut *tx, since)
            .await?;

        tx.commit().await?;

        // Receita mensal: succeeded soma, refunded estorna no mês em que o
        // pagamento tinha sido reconhecido.
        let revenue_events = snapshot.payments.iter().filter_map(|p| {
            let ts = p.paid_at?;
            let signed = match p.status {
                PaymentStatus::Succeeded => p.amount_cents,
                PaymentStatus::Refunded => -p.amount_cents,
                _ => return None,
            };
            Some((ts, signed))
        });

        Ok(AnalyticsOverview {
            revenue: bucket_monthly(revenue_events, now, self.report_offset),
            signups: bucket_monthly(count_events(signups), now, self.report_offset),
            enrollments: bucket_monthly(count_events(enrollments), now, self.report_offset),
            certificates: bucket_monthly(count_events(certificates), now, self.report_offset),
        })
    }
}

fn count_events(
    stamps: Vec<DateTime<Utc>>,
) -> impl IntoIterator<Item = (DateTime<Utc>, i64)> {
    stamps.into_iter().map(|ts| (ts, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn zero_events_still_yield_six_zero_buckets() {
        let now = utc(2026, 8, 8, 12);
        let buckets = bucket_monthly([], now, FixedOffset::east_opt(0).unwrap());

        assert_eq!(buckets.len(), 6);
        let months: Vec<&str> = buckets.iter().map(|b| b.month.as_str()).collect();
        assert_eq!(
            months,
            vec!["2026-03", "2026-04", "2026-05", "2026-06", "2026-07", "2026-08"]
        );
        assert!(buckets.iter().all(|b| b.value == 0));
    }

    #[test]
    fn events_land_in_their_own_month() {
        let now = utc(2026, 8, 8, 12);
        let buckets = bucket_monthly(
            [
                (utc(2026, 3, 1, 0), 100),
                (utc(2026, 3, 31, 23), 50),
                (utc(2026, 8, 8, 1), 7),
                // Fora da janela: ignorado.
                (utc(2026, 2, 28, 12), 999),
                (utc(2025, 8, 8, 12), 999),
            ],
            now,
            FixedOffset::east_opt(0).unwrap(),
        );

        assert_eq!(buckets[0], MonthBucket { month: "2026-03".into(), value: 150 });
        assert_eq!(buckets[5], MonthBucket { month: "2026-08".into(), value: 7 });
        assert_eq!(buckets[1].value + buckets[2].value + buckets[3].value + buckets[4].value, 0);
    }

    #[test]
    fn bucketing_respects_the_configured_offset() {
        // 2026-03-01T01:00Z em UTC-03:00 ainda é 28 de fevereiro local.
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let now = utc(2026, 8, 8, 12);
        let buckets = bucket_monthly([(utc(2026, 3, 1, 1), 10)], now, offset);

        assert_eq!(buckets[0].month, "2026-03");
        assert_eq!(buckets[0].value, 0);
    }

    #[test]
    fn window_crosses_year_boundary() {
        let now = utc(2026, 1, 15, 12);
        let labels = trailing_month_labels(now, FixedOffset::east_opt(0).unwrap());
        assert_eq!(
            labels,
            vec!["2025-08", "2025-09", "2025-10", "2025-11", "2025-12", "2026-01"]
        );
    }

    #[test]
    fn window_start_is_midnight_local_of_oldest_month() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        let now = utc(2026, 8, 8, 12);
        // Mês mais antigo: março/2026; meia-noite local = 03:00Z.
        assert_eq!(window_start(now, offset), utc(2026, 3, 1, 3));
    }
}
