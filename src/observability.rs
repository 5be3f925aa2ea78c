use biometrics::{Collector, Counter, Moments};

pub(crate) static MODERATION_REQUESTS: Counter = Counter::new("parcelchat.moderation.requests");
pub(crate) static MODERATION_ERRORS: Counter = Counter::new("parcelchat.moderation.errors");
pub(crate) static MODERATION_BLOCKED: Counter = Counter::new("parcelchat.moderation.blocked");
pub(crate) static MODERATION_DURATION: Moments =
    Moments::new("parcelchat.moderation.duration_seconds");

pub(crate) static COMPLETION_REQUESTS: Counter = Counter::new("parcelchat.completion.requests");
pub(crate) static COMPLETION_ERRORS: Counter = Counter::new("parcelchat.completion.errors");
pub(crate) static COMPLETION_MALFORMED: Counter = Counter::new("parcelchat.completion.malformed");
pub(crate) static COMPLETION_DURATION: Moments =
    Moments::new("parcelchat.completion.duration_seconds");

pub(crate) static SESSION_TURNS: Counter = Counter::new("parcelchat.session.turns");
pub(crate) static SESSION_CONTEXT_MESSAGES: Moments =
    Moments::new("parcelchat.session.context_messages");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&MODERATION_REQUESTS);
    collector.register_counter(&MODERATION_ERRORS);
    collector.register_counter(&MODERATION_BLOCKED);
    collector.register_moments(&MODERATION_DURATION);

    collector.register_counter(&COMPLETION_REQUESTS);
    collector.register_counter(&COMPLETION_ERRORS);
    collector.register_counter(&COMPLETION_MALFORMED);
    collector.register_moments(&COMPLETION_DURATION);

    collector.register_counter(&SESSION_TURNS);
    collector.register_moments(&SESSION_CONTEXT_MESSAGES);
}
