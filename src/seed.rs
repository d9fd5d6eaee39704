//! Optional sample-data seeding for local development.
//!
//! Roles and the default admin account are always ensured by the account
//! store; this adds demo communities and events on an empty database when
//! `SEED_SAMPLE_DATA` is enabled.

use crate::{
    server::AppState,
    store::{communities::CommunityInput, events::EventInput},
};
use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::info;

pub fn ensure_sample_data(state: &AppState) -> Result<()> {
    if state.communities.list()?.is_empty() {
        info!("Seeding sample communities");
        for (name, description) in [
            ("Tech Innovators", "Technology and programming community"),
            ("Creative Writers", "Writing and literature community"),
            ("Research Circle", "Academic research and publication community"),
        ] {
            state.communities.create(&CommunityInput {
                name: name.to_string(),
                description: Some(description.to_string()),
            })?;
        }
    }

    if state.events.list()?.is_empty() {
        info!("Seeding sample events");
        let today = Utc::now().date_naive();
        for (title, offset_days) in [("Innovation Workshop", 14i64), ("Annual Meetup", 45)] {
            state.events.create(&EventInput {
                title: title.to_string(),
                description: None,
                start_date: today + Duration::days(offset_days),
                end_date: today + Duration::days(offset_days + 1),
                registration_deadline: Some(today + Duration::days(offset_days - 3)),
            })?;
        }
    }

    Ok(())
}
