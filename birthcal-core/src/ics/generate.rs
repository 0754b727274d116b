//! ICS file generation.

use std::time::Duration;

use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::calendar::BirthdayCalendar;
use crate::event::BirthdayEvent;

/// Generate the .ics content of a whole birthday calendar
pub fn generate_calendar(calendar: &BirthdayCalendar) -> String {
    let meta = &calendar.meta;
    let mut cal = Calendar::new();

    cal.append_property(Property::new("METHOD", "PUBLISH"));

    cal.append_property(Property::new("NAME", meta.name.as_str()));
    cal.append_property(Property::new("X-WR-CALNAME", meta.name.as_str()));
    cal.append_property(Property::new("X-WR-CALDESC", meta.description.as_str()));

    cal.append_property(Property::new("TIMEZONE-ID", meta.timezone.name()));
    cal.append_property(Property::new("X-WR-TIMEZONE", meta.timezone.name()));

    let ttl = format_duration(meta.refresh_interval);
    cal.append_property(Property::new("X-PUBLISHED-TTL", ttl.as_str()));
    let mut refresh = Property::new("REFRESH-INTERVAL", ttl.as_str());
    refresh.append_parameter(ValueType::Duration);
    cal.append_property(refresh);

    let dtstamp = calendar.generated_at.format("%Y%m%dT%H%M%SZ").to_string();
    for event in calendar.events() {
        cal.push(build_vevent(event, &dtstamp));
    }

    let cal = cal.done();

    set_product_id(&cal.to_string(), &meta.product_id())
}

fn build_vevent(event: &BirthdayEvent, dtstamp: &str) -> icalendar::Event {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&event.uid);
    ics_event.add_property("DTSTAMP", dtstamp);
    ics_event.summary(&event.summary);

    // All-day: DATE value plus a day-granular duration instead of DTEND
    let mut dtstart = Property::new("DTSTART", event.start.format("%Y%m%d").to_string());
    dtstart.append_parameter(ValueType::Date);
    ics_event.append_property(dtstart);
    ics_event.add_property("DURATION", format!("P{}D", event.duration.num_days()));

    ics_event.add_property("RRULE", &event.rrule);
    ics_event.add_property("STATUS", event.status.as_ics_str());
    ics_event.add_property("TRANSP", event.transparency.as_ics_str());

    if let Some(ref url) = event.url {
        ics_event.add_property("URL", url.as_str());
    }

    if let Some(ref desc) = event.description {
        ics_event.description(desc);
    }

    ics_event.done()
}

/// The icalendar crate writes its own PRODID; replace it with ours.
fn set_product_id(ics: &str, product_id: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(product_id);
        } else {
            result.push_str(line);
        }
        result.push_str("\r\n");
    }

    result
}

/// Format a duration as an RFC 5545 DURATION value (e.g. `PT1H`, `P1D`).
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let days = secs / 86_400;
    let rem = secs % 86_400;

    let mut out = String::from("P");
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if rem > 0 || days == 0 {
        out.push('T');
        let (hours, minutes, seconds) = (rem / 3600, rem % 3600 / 60, rem % 60);
        if hours > 0 {
            out.push_str(&format!("{hours}H"));
        }
        if minutes > 0 {
            out.push_str(&format!("{minutes}M"));
        }
        if seconds > 0 || rem == 0 {
            out.push_str(&format!("{seconds}S"));
        }
    }
    out
}
