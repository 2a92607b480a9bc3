use mfa_provider_core::{Attribute, Block, Schema, Validator};

pub(crate) const TIME_UNITS: &[&str] = &["MINUTES", "SECONDS"];
pub(crate) const PAIRING_KEY_LIFETIME_UNITS: &[&str] = &["MINUTES", "HOURS"];
pub(crate) const DEVICE_SELECTIONS: &[&str] =
    &["DEFAULT_TO_FIRST", "PROMPT_TO_SELECT", "ALWAYS_DISPLAY_DEVICES"];
pub(crate) const NEW_DEVICE_NOTIFICATIONS: &[&str] = &["NONE", "EMAIL_THEN_SMS", "SMS_THEN_EMAIL"];
pub(crate) const VERIFICATION_MODES: &[&str] = &["permissive", "restrictive"];

const SECURITY_KEY_DEPRECATION: &str = "The `security_key` FIDO device type is deprecated and needs to be replaced with the `fido2` device type.  `security_key` will not be configurable for newly created environments, or existing environments that have not had their environment upgraded to use the latest FIDO2 policies.";
const PLATFORM_DEPRECATION: &str = "The `platform` FIDO device type is deprecated and needs to be replaced with the `fido2` device type.  `platform` will not be configurable for newly created environments, or existing environments that have not had their environment upgraded to use the latest FIDO2 policies.";

pub(crate) fn schema() -> Schema {
    Schema::new(
        0,
        vec![
            Attribute::id(),
            Attribute::string("environment_id")
                .required()
                .force_new()
                .validate(Validator::ResourceId)
                .describe("The ID of the environment to create the MFA policy in."),
            Attribute::string("name")
                .required()
                .validate(Validator::LengthAtLeast(1))
                .describe("The name to apply to the MFA policy."),
            Attribute::string("device_selection")
                .default("DEFAULT_TO_FIRST")
                .validate(Validator::OneOf(DEVICE_SELECTIONS))
                .describe("How the user is offered their paired devices at sign-on."),
            Attribute::string("new_device_notification")
                .default("NONE")
                .validate(Validator::OneOf(NEW_DEVICE_NOTIFICATIONS))
                .describe("Whether the user is notified when a new device is paired, and through which channel."),
            Attribute::object("sms", offline_device_block())
                .required()
                .describe("SMS OTP authentication policy settings."),
            Attribute::object("voice", offline_device_block())
                .required()
                .describe("Voice OTP authentication policy settings."),
            Attribute::object("email", offline_device_block())
                .required()
                .describe("Email OTP authentication policy settings."),
            Attribute::object("mobile", mobile_block())
                .required()
                .describe("Mobile authenticator device policy settings."),
            Attribute::object("totp", totp_block())
                .required()
                .describe("TOTP authenticator policy settings."),
            Attribute::object("fido2", fido2_block())
                .optional_computed()
                .validate(Validator::ConflictsWith(&["security_key", "platform"]))
                .describe("FIDO2 device policy settings. Replaces `security_key` and `platform`."),
            Attribute::object("security_key", fido_device_block())
                .validate(Validator::ConflictsWith(&["fido2"]))
                .deprecated(SECURITY_KEY_DEPRECATION)
                .describe("Security key (FIDO) device policy settings."),
            Attribute::object("platform", fido_device_block())
                .validate(Validator::ConflictsWith(&["fido2"]))
                .deprecated(PLATFORM_DEPRECATION)
                .describe("Platform biometrics (FIDO) device policy settings."),
        ],
    )
    .describe("Resource to create and manage MFA device policies in an environment.")
}

fn enabled() -> Attribute {
    Attribute::bool("enabled")
        .required()
        .describe("Enabled or disabled in the policy.")
}

fn pairing_disabled() -> Attribute {
    Attribute::bool("pairing_disabled")
        .default(false)
        .describe("Prevents users from pairing new devices of this type.")
}

/// OTP failure limit and cooldown shared by the mobile and TOTP blocks
fn otp_failure_attributes(cooldown: i64) -> Vec<Attribute> {
    vec![
        Attribute::int("otp_failure_count")
            .default(3)
            .describe("Number of OTP failures allowed before the cooldown starts."),
        Attribute::int("otp_failure_cooldown_duration")
            .default(cooldown)
            .validate(Validator::RequiredWith(&["otp_failure_cooldown_timeunit"])),
        Attribute::string("otp_failure_cooldown_timeunit")
            .default("MINUTES")
            .validate(Validator::OneOf(TIME_UNITS))
            .validate(Validator::RequiredWith(&["otp_failure_cooldown_duration"])),
    ]
}

fn offline_device_block() -> Block {
    let mut attributes = vec![
        enabled(),
        pairing_disabled(),
        Attribute::int("otp_lifetime_duration")
            .default(30)
            .describe("How long an OTP stays valid."),
        Attribute::string("otp_lifetime_timeunit")
            .default("MINUTES")
            .validate(Validator::OneOf(TIME_UNITS))
            .validate(Validator::RequiredWith(&["otp_lifetime_duration"])),
    ];
    attributes.extend(otp_failure_attributes(0));
    Block::new(attributes)
}

fn mobile_block() -> Block {
    let mut attributes = vec![enabled()];
    attributes.extend(otp_failure_attributes(2));
    attributes.push(
        Attribute::object_set("application", mobile_application_block())
            .describe("Settings for the native applications the mobile authenticator is used with."),
    );
    Block::new(attributes)
}

fn mobile_application_block() -> Block {
    Block::new(vec![
        Attribute::string("id")
            .required()
            .validate(Validator::ResourceId)
            .describe("The ID of a native OIDC application with mobile settings."),
        pairing_disabled(),
        Attribute::bool("push_enabled").required(),
        Attribute::bool("otp_enabled").required(),
        Attribute::int("push_timeout_duration")
            .default(40)
            .validate(Validator::IntBetween(40, 150))
            .describe("Seconds a push notification waits for the user before timing out."),
        Attribute::string("push_timeout_timeunit")
            .computed()
            .describe("Always `SECONDS`."),
        Attribute::int("pairing_key_lifetime_duration").default(10),
        Attribute::string("pairing_key_lifetime_timeunit")
            .default("MINUTES")
            .validate(Validator::OneOf(PAIRING_KEY_LIFETIME_UNITS)),
        Attribute::int("push_limit_count")
            .default(5)
            .validate(Validator::IntBetween(1, 50))
            .describe("Push notifications allowed within the time period before further pushes are blocked."),
        Attribute::int("push_limit_lock_duration")
            .default(30)
            .validate(Validator::IntAtLeast(1)),
        Attribute::string("push_limit_lock_duration_timeunit")
            .default("MINUTES")
            .validate(Validator::OneOf(TIME_UNITS)),
        Attribute::int("push_limit_time_period_duration")
            .default(10)
            .validate(Validator::IntAtLeast(1)),
        Attribute::string("push_limit_time_period_timeunit")
            .default("MINUTES")
            .validate(Validator::OneOf(TIME_UNITS)),
        Attribute::bool("device_authorization_enabled").default(false),
        Attribute::string("device_authorization_extra_verification")
            .validate(Validator::OneOf(VERIFICATION_MODES)),
        Attribute::bool("auto_enrollment_enabled").default(false),
        Attribute::string("integrity_detection")
            .validate(Validator::OneOf(VERIFICATION_MODES))
            .describe("Required when the application has integrity detection enabled, and rejected otherwise."),
    ])
}

fn totp_block() -> Block {
    let mut attributes = vec![enabled(), pairing_disabled()];
    attributes.extend(otp_failure_attributes(2));
    Block::new(attributes)
}

fn fido2_block() -> Block {
    Block::new(vec![
        enabled(),
        pairing_disabled(),
        Attribute::string("fido2_policy_id")
            .validate(Validator::ResourceId)
            .describe("The FIDO2 policy applied to this device type. The environment default applies when unset."),
    ])
}

fn fido_device_block() -> Block {
    Block::new(vec![
        enabled(),
        pairing_disabled(),
        Attribute::string("fido_policy_id").validate(Validator::ResourceId),
    ])
}
