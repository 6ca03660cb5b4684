pub mod application;
pub mod job;
pub mod profile;
pub mod user;

pub use application::{Application, ApplicationStatus};
pub use job::{format_pay_range, Job, JobCard, JobStatus, PublicJobCard};
pub use profile::{Accomplishment, Education, EntryDetails, Experience, ProfileEntry, Project, Section};
pub use user::{Role, User};

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision PostgreSQL keeps, so cursors taken from
/// either store compare equal after a round trip.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
