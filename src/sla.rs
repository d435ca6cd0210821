//! Per-ticket breach classification and aggregate compliance.

use crate::error::{AnalysisError, AnalysisResult};
use crate::model::{ComplianceSummary, EvaluatedTicket, Ticket};
use chrono::NaiveDateTime;

/// Resolution target. A ticket breaches only when strictly over it.
pub const SLA_THRESHOLD_HOURS: f64 = 24.0;

const NANOS_PER_HOUR: f64 = 3_600_000_000_000.0;

/// Signed hours from `created_at` to `ended_at`.
pub fn elapsed_hours(created_at: &NaiveDateTime, ended_at: &NaiveDateTime) -> f64 {
    let delta = ended_at.signed_duration_since(*created_at);
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / NANOS_PER_HOUR,
        None => delta.num_seconds() as f64 / 3600.0,
    }
}

pub fn is_breached(elapsed_hours: f64) -> bool {
    elapsed_hours > SLA_THRESHOLD_HOURS
}

pub fn evaluate_ticket(ticket: Ticket) -> EvaluatedTicket {
    let elapsed_hours = elapsed_hours(&ticket.created_at, &ticket.ended_at);
    EvaluatedTicket {
        breached: is_breached(elapsed_hours),
        elapsed_hours,
        ticket,
    }
}

/// Evaluates every ticket and summarises the set. Fails on an empty set
/// instead of dividing by zero.
pub fn evaluate(tickets: &[Ticket]) -> AnalysisResult<(Vec<EvaluatedTicket>, ComplianceSummary)> {
    let evaluated: Vec<EvaluatedTicket> = tickets.iter().cloned().map(evaluate_ticket).collect();
    let summary = summarize(&evaluated)?;
    Ok((evaluated, summary))
}

pub fn summarize(evaluated: &[EvaluatedTicket]) -> AnalysisResult<ComplianceSummary> {
    if evaluated.is_empty() {
        return Err(AnalysisError::EmptyWorkingSet);
    }

    let total = evaluated.len();
    let breached_count = evaluated.iter().filter(|t| t.breached).count();
    let within_count = total - breached_count;
    let hours_sum: f64 = evaluated.iter().map(|t| t.elapsed_hours).sum();

    let breached_rate = breached_count as f64 / total as f64;
    // Derived by subtraction so the two rates always sum to exactly 1.0.
    let compliance_rate = 1.0 - breached_rate;

    Ok(ComplianceSummary {
        total,
        within_count,
        breached_count,
        average_elapsed_hours: hours_sum / total as f64,
        breached_rate,
        compliance_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, TimeDelta};
    use proptest::prelude::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn ticket(id: &str, delta: TimeDelta) -> Ticket {
        Ticket {
            id: Some(CellValue::Text(id.to_string())),
            created_at: start(),
            ended_at: start() + delta,
        }
    }

    #[test]
    fn exactly_threshold_is_within() {
        let evaluated = evaluate_ticket(ticket("A", TimeDelta::hours(24)));
        assert_eq!(evaluated.elapsed_hours, 24.0);
        assert!(!evaluated.breached);
    }

    #[test]
    fn just_over_threshold_is_breached() {
        assert!(!is_breached(24.0));
        assert!(is_breached(24.000_000_1));
        // 24.0000001 h == 86_400_000_360_000 ns
        let evaluated = evaluate_ticket(ticket("A", TimeDelta::nanoseconds(86_400_000_360_000)));
        assert!(evaluated.breached);
    }

    #[test]
    fn negative_durations_count_as_compliant() {
        let tickets = vec![
            ticket("early", TimeDelta::hours(-6)),
            ticket("slow", TimeDelta::hours(30)),
        ];
        let (evaluated, summary) = evaluate(&tickets).unwrap();
        assert_eq!(evaluated[0].elapsed_hours, -6.0);
        assert!(!evaluated[0].breached);
        assert_eq!(summary.within_count, 1);
        assert_eq!(summary.breached_count, 1);
        assert_eq!(summary.average_elapsed_hours, 12.0);
    }

    #[test]
    fn empty_set_is_rejected() {
        assert_matches!(evaluate(&[]), Err(AnalysisError::EmptyWorkingSet));
    }

    #[test]
    fn rates_for_mixed_set() {
        let tickets = vec![
            ticket("a", TimeDelta::hours(1)),
            ticket("b", TimeDelta::hours(2)),
            ticket("c", TimeDelta::hours(48)),
            ticket("d", TimeDelta::minutes(90)),
        ];
        let (_, summary) = evaluate(&tickets).unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.breached_rate, 0.25);
        assert_eq!(summary.compliance_rate, 0.75);
        assert_eq!(summary.average_elapsed_hours, 13.125);
    }

    fn arb_tickets() -> impl Strategy<Value = Vec<Ticket>> {
        prop::collection::vec(-200_000i64..2_000_000, 1..64).prop_map(|minutes| {
            minutes
                .into_iter()
                .enumerate()
                .map(|(i, m)| ticket(&format!("T{i}"), TimeDelta::minutes(m)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn rates_sum_to_one(tickets in arb_tickets()) {
            let (_, summary) = evaluate(&tickets).unwrap();
            prop_assert_eq!(summary.compliance_rate + summary.breached_rate, 1.0);
            prop_assert_eq!(summary.within_count + summary.breached_count, summary.total);
        }

        #[test]
        fn evaluation_is_pure(tickets in arb_tickets()) {
            let first = evaluate(&tickets).unwrap();
            let second = evaluate(&tickets).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
