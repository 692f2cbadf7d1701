use std::time::Duration;

/// Application name
pub const APP_NAME: &str = "SkillsNexus";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Partner e-mail domains allowed into the partner console
pub const DEFAULT_PARTNER_DOMAINS: &[&str] = &["@thedccsa.org", "@jmdev.co.za"];

/// Country assumed before the identity provider says otherwise
pub const DEFAULT_COUNTRY_CODE: &str = "ZA";

/// Display name used when the identity provider supplies none
pub const DEFAULT_DISPLAY_NAME: &str = "Student";

// -- Generative AI --

pub const TUTOR_MODEL: &str = "gemini-2.5-flash";
pub const TUTOR_TEMPERATURE: f32 = 0.7;
/// Soft cap on tutor answers, enforced through the system instruction.
pub const TUTOR_WORD_LIMIT: usize = 100;

pub const VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const VIDEO_RESOLUTION: &str = "720p";
pub const VIDEO_ASPECT_RATIO: &str = "16:9";

/// 20 polls x 5 s = 100 s before a video job is reported as timed out.
pub const VIDEO_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const VIDEO_POLL_MAX_ATTEMPTS: u32 = 20;

pub const TUTOR_UNAVAILABLE: &str =
    "I'm sorry, but the AI service is currently unavailable. Please check the API key configuration.";
pub const TUTOR_CONNECTION_FAILED: &str =
    "I apologize, but I'm having trouble connecting to the knowledge base right now.";
pub const TUTOR_EMPTY_ANSWER: &str = "I couldn't generate a response at this time.";

pub const VIDEO_KEY_MISSING: &str = "API Key missing";
pub const VIDEO_TIMED_OUT: &str = "Video generation timed out.";
pub const VIDEO_NO_URI: &str = "No video URI returned.";

// -- Payments --

/// Artificial latency of a sandbox charge.
pub const SANDBOX_CHARGE_DELAY: Duration = Duration::from_millis(2000);

/// Artificial latency of a sandbox sign-in.
pub const SANDBOX_SIGN_IN_DELAY: Duration = Duration::from_millis(800);

pub const REFERRAL_INVALID: &str = "Invalid or expired referral code.";
pub const PAYMENT_RETRY_PROMPT: &str = "Payment simulation failed. Please try again.";

// -- Chat --

pub const SUPPORT_WELCOME: &str = "Welcome to SkillsNexus Support. How can we help you today?";
pub const SUPPORT_AGENT_REPLY: &str = "I'm connecting you with a live specialist. They typically respond within 2 minutes. While you wait, check our 'Pricing' section for detailed tier information.";
pub const SUPPORT_HIGH_VOLUME: &str = "We are experiencing high volume. Please try again later.";
pub const SUPPORT_AI_CONTEXT: &str = "General Inquiry from Landing Page";

/// Words that route a support message to a human agent instead of the tutor.
pub const SUPPORT_KEYWORDS: &[&str] = &["price", "cost", "human", "support", "refund"];

/// Simulated response time of the live agent.
pub const SUPPORT_AGENT_DELAY: Duration = Duration::from_millis(1500);
