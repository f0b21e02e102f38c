//! Turns one tick's game state into the presence to show

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::context::{PlayerSnapshot, QueueStatus, SynthesisContext};
use super::hash::anonymize_id;
use super::record::{
    ImageAsset, Party, PresenceRecord, AWAY_SMALL_IMAGE_KEY, DEFAULT_LARGE_IMAGE_KEY,
    DEFAULT_SMALL_IMAGE_KEY,
};
use crate::localization::{fill, keys, title_case, Audience, Localizer};
use crate::settings::RichPresenceConfig;

/// Max size shown for cross-realm parties
const CROSS_REALM_PARTY_MAX: u32 = 8;

pub struct PresenceSynthesizer {
    start_time: DateTime<Utc>,
    in_queue: bool,
    /// Menu record requested but not yet accepted by the session
    menu_pending: bool,
}

impl PresenceSynthesizer {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            start_time: now,
            in_queue: false,
            menu_pending: false,
        }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Restart the elapsed timer if configured. Returns the start to display.
    pub fn reset_start_time(
        &mut self,
        config: &RichPresenceConfig,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if config.reset_time_when_changing_zones {
            self.start_time = now;
        }
        self.display_start(config)
    }

    pub fn display_start(&self, config: &RichPresenceConfig) -> Option<DateTime<Utc>> {
        config.show_start_time.then_some(self.start_time)
    }

    pub fn menu_record(
        &self,
        config: &RichPresenceConfig,
        localizer: &dyn Localizer,
    ) -> PresenceRecord {
        PresenceRecord::menu(
            localizer.localize(keys::IN_MENUS, Audience::Client),
            self.display_start(config),
        )
    }

    /// Restart the timer and return the menu record. Idle ticks repeat it until
    /// [`confirm_delivery`](Self::confirm_delivery) is called.
    pub fn default_record(
        &mut self,
        config: &RichPresenceConfig,
        localizer: &dyn Localizer,
        now: DateTime<Utc>,
    ) -> PresenceRecord {
        self.reset_start_time(config, now);
        self.menu_pending = true;
        self.menu_record(config, localizer)
    }

    /// The last record returned reached the session (sent or already shown)
    pub fn confirm_delivery(&mut self) {
        self.menu_pending = false;
    }

    /// Compute this tick's record. `None` means nothing should be sent.
    pub fn synthesize(
        &mut self,
        ctx: &SynthesisContext,
        config: &RichPresenceConfig,
        localizer: &dyn Localizer,
        now: DateTime<Utc>,
    ) -> Option<PresenceRecord> {
        match &ctx.player {
            Some(player) => {
                self.in_queue = false;
                self.menu_pending = false;
                Some(self.in_world(player, ctx, config, localizer))
            }
            None => self.not_in_world(ctx, config, localizer, now),
        }
    }

    fn not_in_world(
        &mut self,
        ctx: &SynthesisContext,
        config: &RichPresenceConfig,
        localizer: &dyn Localizer,
        now: DateTime<Utc>,
    ) -> Option<PresenceRecord> {
        let queue = ctx.queue.filter(|_| config.show_login_queue_position);

        let Some(queue) = queue else {
            if self.in_queue {
                // Left the queue without reaching the world
                self.in_queue = false;
                return Some(self.default_record(config, localizer, now));
            }
            if self.menu_pending {
                return Some(self.menu_record(config, localizer));
            }
            return None;
        };

        if !queue.is_known() {
            // Position not loaded yet, wait for the next tick
            return None;
        }

        self.in_queue = true;
        self.menu_pending = false;
        Some(self.queue_record(&queue, config, localizer))
    }

    fn queue_record(
        &self,
        queue: &QueueStatus,
        config: &RichPresenceConfig,
        localizer: &dyn Localizer,
    ) -> PresenceRecord {
        let details = fill(
            &localizer.localize(keys::IN_LOGIN_QUEUE, Audience::Client),
            &[&queue.position],
        );

        let state = match queue.estimate {
            Some(estimate) if estimate.as_secs_f64() >= 1.0 => fill(
                &localizer.localize(keys::QUEUE_ESTIMATE, Audience::Client),
                &[&format_estimate(estimate)],
            ),
            _ => String::new(),
        };

        PresenceRecord::builder()
            .details(details)
            .state(state)
            .large_image(ImageAsset::new(DEFAULT_LARGE_IMAGE_KEY, ""))
            .small_image(ImageAsset::new(DEFAULT_SMALL_IMAGE_KEY, ""))
            .start(self.display_start(config))
            .build()
    }

    fn in_world(
        &self,
        player: &PlayerSnapshot,
        ctx: &SynthesisContext,
        config: &RichPresenceConfig,
        localizer: &dyn Localizer,
    ) -> PresenceRecord {
        let localize = |key: &str| localizer.localize(key, Audience::Client);
        let world = &player.current_world.name;

        let mut details = format!("{} @ {}", player.name, world);
        let mut state = world.clone();

        let mut territory_name = localize(keys::THE_SOURCE);
        let mut territory_region = localize(keys::VOID);
        let mut large_image = ImageAsset::new(DEFAULT_LARGE_IMAGE_KEY, territory_name.as_str());
        let mut small_key = DEFAULT_SMALL_IMAGE_KEY.to_string();
        let mut small_text = localize(keys::ONLINE);

        if ctx.territory_id != 0 {
            match &ctx.territory {
                Some(territory) => {
                    territory_name = territory
                        .place_name
                        .clone()
                        .unwrap_or_else(|| localize(keys::UNKNOWN));
                    territory_region = territory
                        .region
                        .clone()
                        .unwrap_or_else(|| localize(keys::UNKNOWN));

                    large_image = ImageAsset::new(
                        format!("li_{}", territory.loading_image),
                        territory_name.as_str(),
                    );
                    state = territory_name.clone();
                }
                None => {
                    tracing::warn!(
                        "Failed to retrieve data for territory {}, not sending location",
                        ctx.territory_id
                    );
                }
            }
        }

        if config.show_name {
            let same_world = player.current_world.id == player.home_world.id;
            if config.show_free_company && same_world && !player.company_tag.is_empty() {
                details = format!("{} «{}» @ {}", player.name, player.company_tag, world);
            } else if config.show_world && !same_world {
                details = format!("{} (home: {})", details, player.home_world.name);
            }
        } else {
            details = territory_name.clone();
        }

        if config.show_job {
            small_key = format!("class_{}", player.job.id);
            small_text = if config.abbreviate_job {
                player.job.abbreviation.clone()
            } else {
                title_case(&player.job.name)
            };

            if config.show_level {
                let level = fill(&localize(keys::LEVEL), &[&player.level]);
                small_text = format!("{} {}", small_text, level);
            }
        }

        let mut party = None;
        if config.show_party {
            if ctx.party.size > 0 && ctx.party.party_id != 0 {
                let max = ctx
                    .instanced_content
                    .map(|content| content.max_party_size())
                    .unwrap_or(8);
                if ctx.instanced_content.is_some() {
                    state = localize(keys::IN_A_DUTY);
                }
                party = Some(Party::new(ctx.party.size, max, anonymize_id(ctx.party.party_id)));
            } else if let Some(cross_realm) = &ctx.cross_realm_party {
                if let Some(lowest) = cross_realm.representative_id() {
                    party = Some(Party::new(
                        cross_realm.member_content_ids.len() as u32,
                        CROSS_REALM_PARTY_MAX,
                        anonymize_id(lowest),
                    ));
                }
            }
        }

        if !config.show_world {
            state = if config.show_name {
                territory_name
            } else {
                territory_region
            };
        }

        if config.show_afk {
            if let Some(status) = player.online_status.as_ref().filter(|s| s.is_away()) {
                state = status.name.clone();
                small_key = AWAY_SMALL_IMAGE_KEY.to_string();
            }
        }

        PresenceRecord::builder()
            .details(details)
            .state(state)
            .large_image(large_image)
            .small_image(ImageAsset::new(small_key, small_text))
            .start(self.display_start(config))
            .party(party)
            .build()
    }
}

/// `hh:mm:ss`, hours not wrapped at 24
fn format_estimate(estimate: Duration) -> String {
    let secs = estimate.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
