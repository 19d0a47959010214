//! Date availability
//!
//! Decides whether a calendar day can still be booked for a car. The same
//! predicate greys out days in date pickers and validates submitted ranges, so
//! the selectable days and the valid days can never diverge.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rental_core::config::BookingConfig;
use rental_core::dates::{day_start, days_starting, tomorrow};
use rental_core::models::{Reservation, ReservationStatus};
use serde::Serialize;

use crate::constants::{LEAD_TIME_DAYS, PENDING_HOLD_MINUTES};

/// Tunables of the availability rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityPolicy {
    /// How long a PENDING reservation keeps blocking its dates
    pub pending_hold: Duration,
    /// Whole days between today and the first bookable day
    pub lead_time_days: i64,
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self {
            pending_hold: Duration::minutes(PENDING_HOLD_MINUTES),
            lead_time_days: LEAD_TIME_DAYS,
        }
    }
}

impl From<&BookingConfig> for AvailabilityPolicy {
    fn from(config: &BookingConfig) -> Self {
        Self {
            pending_hold: Duration::minutes(config.pending_hold_minutes),
            lead_time_days: config.lead_time_days,
        }
    }
}

/// Why a day cannot be booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// Today or earlier, inside the lead time
    LeadTime,
    /// Held by a confirmed or completed reservation
    Reserved,
    /// Held by a pending reservation that has not expired yet
    PendingHold,
}

/// One day of an availability calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<BlockReason>,
}

impl AvailabilityPolicy {
    /// First bookable instant relative to `now`
    pub fn earliest_start(&self, now: NaiveDateTime) -> NaiveDateTime {
        tomorrow(now) + Duration::days(self.lead_time_days - 1)
    }

    /// A PENDING reservation past its hold window is treated as abandoned
    pub fn is_pending_expired(&self, reservation: &Reservation, now: NaiveDateTime) -> bool {
        reservation.status == ReservationStatus::Pending
            && reservation.age(now) >= self.pending_hold
    }

    /// Whether the reservation currently occupies its dates
    pub fn is_holding(&self, reservation: &Reservation, now: NaiveDateTime) -> bool {
        reservation.status.blocks_dates() && !self.is_pending_expired(reservation, now)
    }

    /// Why `date` cannot be booked, or `None` if it can
    pub fn block_reason(
        &self,
        date: NaiveDate,
        reservations: &[Reservation],
        now: NaiveDateTime,
    ) -> Option<BlockReason> {
        if day_start(date) < self.earliest_start(now) {
            return Some(BlockReason::LeadTime);
        }

        self.blocking_reservation(date, reservations, now)
            .map(|reservation| match reservation.status {
                ReservationStatus::Pending => BlockReason::PendingHold,
                _ => BlockReason::Reserved,
            })
    }

    /// The first reservation that holds `date`, ignoring the lead-time rule
    pub fn blocking_reservation<'a>(
        &self,
        date: NaiveDate,
        reservations: &'a [Reservation],
        now: NaiveDateTime,
    ) -> Option<&'a Reservation> {
        reservations
            .iter()
            .find(|r| self.is_holding(r, now) && r.covers(date))
    }

    /// Whether `date` is unavailable for booking
    pub fn is_date_blocked(
        &self,
        date: NaiveDate,
        reservations: &[Reservation],
        now: NaiveDateTime,
    ) -> bool {
        self.block_reason(date, reservations, now).is_some()
    }

    /// Availability of `days` consecutive days starting at `from`
    ///
    /// Shorter than `days` only when the window runs past the last
    /// representable date.
    pub fn calendar(
        &self,
        from: NaiveDate,
        days: i64,
        reservations: &[Reservation],
        now: NaiveDateTime,
    ) -> Vec<DayAvailability> {
        let count = usize::try_from(days).unwrap_or(0);
        days_starting(from, count)
            .map(|date| {
                let reason = self.block_reason(date, reservations, now);
                DayAvailability {
                    date,
                    disabled: reason.is_some(),
                    reason,
                }
            })
            .collect()
    }

    /// The first blocked day within `[from, to]`, if any
    ///
    /// Linear in the number of reservations, whatever the range length.
    pub fn first_blocked_in(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        reservations: &[Reservation],
        now: NaiveDateTime,
    ) -> Option<NaiveDate> {
        if from > to {
            return None;
        }

        // lead-time days form a prefix of the calendar
        if day_start(from) < self.earliest_start(now) {
            return Some(from);
        }

        reservations
            .iter()
            .filter(|r| self.is_holding(r, now) && r.overlaps(from, to))
            .map(|r| r.start_date.date().max(from))
            .min()
    }

    /// Hold state of a PENDING reservation; `None` for any other status
    pub fn hold_state(&self, reservation: &Reservation, now: NaiveDateTime) -> Option<HoldState> {
        if !reservation.is_pending() {
            return None;
        }

        Some(if self.is_pending_expired(reservation, now) {
            HoldState::Expired
        } else {
            HoldState::Active
        })
    }

    /// When a PENDING reservation stops holding its dates
    pub fn hold_expires_at(&self, reservation: &Reservation) -> Option<NaiveDateTime> {
        reservation
            .is_pending()
            .then(|| reservation.created_at.checked_add_signed(self.pending_hold))
            .flatten()
    }
}

/// Whether a pending reservation still holds its dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldState {
    /// Inside the hold window; the dates stay blocked
    Active,
    /// Past the hold window; treated as abandoned
    Expired,
}

/// `AvailabilityPolicy::is_date_blocked` under the default rules
pub fn is_date_blocked(date: NaiveDate, reservations: &[Reservation], now: NaiveDateTime) -> bool {
    AvailabilityPolicy::default().is_date_blocked(date, reservations, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    fn reservation(
        status: ReservationStatus,
        start: NaiveDate,
        end: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Reservation {
        Reservation {
            id: 1,
            car_id: Some(1),
            user_id: Some(1),
            start_date: day_start(start),
            end_date: day_start(end),
            total_price: None,
            status,
            created_at,
            updated_at: None,
        }
    }

    #[test]
    fn test_tomorrow_is_free_without_reservations() {
        let now = at("2024-06-01T10:00:00");
        assert!(!is_date_blocked((now + Duration::days(1)).date(), &[], now));
    }

    #[test]
    fn test_today_is_always_blocked() {
        let now = at("2024-06-01T10:00:00");
        assert!(is_date_blocked(now.date(), &[], now));
        assert!(is_date_blocked(day(2024, 5, 20), &[], now));

        // late in the evening tomorrow is still bookable
        let late = at("2024-06-01T23:59:00");
        assert!(!is_date_blocked(day(2024, 6, 2), &[], late));
    }

    #[test]
    fn test_confirmed_reservation_blocks_its_range() {
        let now = at("2024-06-01T10:00:00");
        let res = [reservation(
            ReservationStatus::Confirmed,
            day(2024, 6, 10),
            day(2024, 6, 15),
            at("2024-05-01T10:00:00"),
        )];

        assert!(is_date_blocked(day(2024, 6, 10), &res, now));
        assert!(is_date_blocked(day(2024, 6, 12), &res, now));
        assert!(is_date_blocked(day(2024, 6, 15), &res, now));
        assert!(!is_date_blocked(day(2024, 6, 9), &res, now));
        assert!(!is_date_blocked(day(2024, 6, 16), &res, now));
    }

    #[test]
    fn test_cancelled_reservation_never_blocks() {
        let now = at("2024-06-01T10:00:00");
        let res = [reservation(
            ReservationStatus::Cancelled,
            day(2024, 6, 10),
            day(2024, 6, 15),
            at("2024-06-01T09:55:00"),
        )];

        assert!(!is_date_blocked(day(2024, 6, 12), &res, now));
    }

    #[test]
    fn test_pending_reservation_soft_expires() {
        let now = at("2024-06-01T10:00:00");
        let fresh = [reservation(
            ReservationStatus::Pending,
            day(2024, 6, 10),
            day(2024, 6, 12),
            now - Duration::minutes(10),
        )];
        let stale = [reservation(
            ReservationStatus::Pending,
            day(2024, 6, 10),
            day(2024, 6, 12),
            now - Duration::minutes(31),
        )];

        assert!(is_date_blocked(day(2024, 6, 11), &fresh, now));
        assert!(!is_date_blocked(day(2024, 6, 11), &stale, now));
    }

    #[test]
    fn test_pending_hold_boundary_is_exclusive() {
        let now = at("2024-06-01T10:00:00");
        let res = reservation(
            ReservationStatus::Pending,
            day(2024, 6, 10),
            day(2024, 6, 12),
            now - Duration::minutes(30),
        );
        let policy = AvailabilityPolicy::default();

        assert!(policy.is_pending_expired(&res, now));
        assert!(!policy.is_pending_expired(&res, now - Duration::seconds(1)));
    }

    #[test]
    fn test_block_reasons() {
        let now = at("2024-06-01T10:00:00");
        let policy = AvailabilityPolicy::default();
        let res = [
            reservation(
                ReservationStatus::Confirmed,
                day(2024, 6, 10),
                day(2024, 6, 11),
                at("2024-05-01T00:00:00"),
            ),
            reservation(
                ReservationStatus::Pending,
                day(2024, 6, 20),
                day(2024, 6, 21),
                now - Duration::minutes(5),
            ),
        ];

        assert_eq!(
            policy.block_reason(day(2024, 6, 1), &res, now),
            Some(BlockReason::LeadTime)
        );
        assert_eq!(
            policy.block_reason(day(2024, 6, 10), &res, now),
            Some(BlockReason::Reserved)
        );
        assert_eq!(
            policy.block_reason(day(2024, 6, 21), &res, now),
            Some(BlockReason::PendingHold)
        );
        assert_eq!(policy.block_reason(day(2024, 6, 15), &res, now), None);
    }

    #[test]
    fn test_calendar_marks_disabled_days() {
        let now = at("2024-06-01T10:00:00");
        let res = [reservation(
            ReservationStatus::Confirmed,
            day(2024, 6, 3),
            day(2024, 6, 4),
            at("2024-05-01T00:00:00"),
        )];

        let calendar = AvailabilityPolicy::default().calendar(day(2024, 6, 1), 5, &res, now);
        let disabled: Vec<bool> = calendar.iter().map(|d| d.disabled).collect();

        assert_eq!(disabled, vec![true, false, true, true, false]);
        assert_eq!(calendar[4].date, day(2024, 6, 5));
        assert!(AvailabilityPolicy::default()
            .calendar(day(2024, 6, 1), 0, &res, now)
            .is_empty());
    }

    #[test]
    fn test_longer_lead_time() {
        let now = at("2024-06-01T10:00:00");
        let policy = AvailabilityPolicy {
            lead_time_days: 3,
            ..Default::default()
        };

        assert!(policy.is_date_blocked(day(2024, 6, 3), &[], now));
        assert!(!policy.is_date_blocked(day(2024, 6, 4), &[], now));
    }

    #[test]
    fn test_calendar_near_last_date_does_not_overflow() {
        let now = at("2024-06-01T10:00:00");
        let from = NaiveDate::MAX - Duration::days(1);

        let calendar = AvailabilityPolicy::default().calendar(from, 5, &[], now);
        assert!(calendar.len() < 5);
        assert!(calendar.iter().all(|d| !d.disabled));
    }

    #[test]
    fn test_first_blocked_in_huge_range_is_immediate() {
        let now = at("2024-06-01T10:00:00");
        let res = [reservation(
            ReservationStatus::Confirmed,
            day(2030, 1, 1),
            day(2030, 1, 5),
            at("2024-05-01T00:00:00"),
        )];
        let policy = AvailabilityPolicy::default();

        assert_eq!(
            policy.first_blocked_in(day(2024, 6, 10), NaiveDate::MAX, &res, now),
            Some(day(2030, 1, 1))
        );
        assert_eq!(
            policy.first_blocked_in(day(2024, 6, 10), NaiveDate::MAX, &[], now),
            None
        );
        assert_eq!(
            policy.first_blocked_in(now.date(), day(2024, 6, 5), &[], now),
            Some(now.date())
        );
    }

    #[test]
    fn test_hold_state() {
        let now = at("2024-06-01T10:00:00");
        let policy = AvailabilityPolicy::default();
        let fresh = reservation(
            ReservationStatus::Pending,
            day(2024, 6, 10),
            day(2024, 6, 12),
            now - Duration::minutes(10),
        );
        let stale = reservation(
            ReservationStatus::Pending,
            day(2024, 6, 10),
            day(2024, 6, 12),
            now - Duration::minutes(45),
        );
        let confirmed = reservation(
            ReservationStatus::Confirmed,
            day(2024, 6, 10),
            day(2024, 6, 12),
            now - Duration::minutes(10),
        );

        assert_eq!(policy.hold_state(&fresh, now), Some(HoldState::Active));
        assert_eq!(policy.hold_state(&stale, now), Some(HoldState::Expired));
        assert_eq!(policy.hold_state(&confirmed, now), None);
        assert_eq!(
            policy.hold_expires_at(&fresh),
            Some(now + Duration::minutes(20))
        );
        assert_eq!(policy.hold_expires_at(&confirmed), None);
    }

    #[test]
    fn test_first_blocked_in_range() {
        let now = at("2024-06-01T10:00:00");
        let res = [reservation(
            ReservationStatus::Confirmed,
            day(2024, 6, 12),
            day(2024, 6, 12),
            at("2024-05-01T00:00:00"),
        )];
        let policy = AvailabilityPolicy::default();

        assert_eq!(
            policy.first_blocked_in(day(2024, 6, 10), day(2024, 6, 14), &res, now),
            Some(day(2024, 6, 12))
        );
        assert_eq!(
            policy.first_blocked_in(day(2024, 6, 13), day(2024, 6, 14), &res, now),
            None
        );
    }

    fn any_reservation() -> impl Strategy<Value = Reservation> {
        (
            0i64..40,
            0i64..6,
            prop_oneof![
                Just(ReservationStatus::Pending),
                Just(ReservationStatus::Confirmed),
                Just(ReservationStatus::Cancelled),
                Just(ReservationStatus::Completed),
            ],
            0i64..60,
        )
            .prop_map(|(offset, len, status, age)| {
                let start = day(2024, 6, 1) + Duration::days(offset);
                reservation(
                    status,
                    start,
                    start + Duration::days(len),
                    at("2024-06-01T10:00:00") - Duration::minutes(age),
                )
            })
    }

    proptest! {
        #[test]
        fn prop_first_blocked_matches_day_by_day_scan(
            reservations in proptest::collection::vec(any_reservation(), 0..6),
            from_offset in 0i64..45,
            len in 0i64..20,
        ) {
            let now = at("2024-06-01T10:00:00");
            let policy = AvailabilityPolicy::default();
            let from = day(2024, 6, 1) + Duration::days(from_offset);
            let to = from + Duration::days(len);

            let scanned = from
                .iter_days()
                .take_while(|d| *d <= to)
                .find(|d| policy.is_date_blocked(*d, &reservations, now));

            prop_assert_eq!(policy.first_blocked_in(from, to, &reservations, now), scanned);
        }
    }
}
