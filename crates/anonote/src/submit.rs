use crate::annotate::{annotate, AnnotateRequest};
use crate::config::ClientConfig;
use crate::limits;
use crate::profile::mint_anon_profile;
use crate::publish::{publish_direct, publish_hop, PublishStrategy};
use crate::storage::{ClientStorage, LAST_SUBMIT_TIME};
use crate::subs;
use crate::thread::ThreadState;
use crate::time::unix_time_secs;
use crate::Result;

use anostr::{
    sign_note, FullKeypair, Note, NoteId, NoteKind, NoteTemplate, RelayIo, RelayPool, WsIo,
};

use rand::rngs::ThreadRng;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

/// Per-action options, as toggled by the caller's UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitOptions {
    /// Link this post to the session's previous one.
    pub reply_chain: bool,
    /// Publish through one random relay with fallback instead of all.
    pub relay_hop: bool,
    /// Publish to the onion relay set.
    pub use_tor_relays: bool,
}

/// The single terminal result of a submission action. Every path
/// through the orchestrator ends in exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The global cooldown since the last submission has not elapsed.
    Cooldown { wait_secs: u64 },
    EmptyInput,
    /// Same content was already submitted inside the dedup window.
    Duplicate,
    /// A rate-limit target of this action has an exhausted window.
    RateLimited { target: String },
    /// No relay accepted the profile; the action was aborted before
    /// any content was published under the minted identity.
    ProfilePublishFailed,
    /// The profile propagated but no relay accepted the note itself.
    ContentPublishFailed,
    Published {
        event_id: NoteId,
        accepted: usize,
        total: usize,
        hopped: bool,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Published { .. })
    }

    /// Delivered, but to fewer relays than were asked. Degraded
    /// success rather than an error.
    pub fn is_partial(&self) -> bool {
        matches!(
            self,
            Outcome::Published {
                accepted,
                total,
                hopped: false,
                ..
            } if accepted < total
        )
    }

    /// Web link to the published event, for success status messages.
    pub fn event_link(&self) -> Option<String> {
        match self {
            Outcome::Published { event_id, .. } => {
                Some(format!("https://njump.me/{}", event_id.hex()))
            }
            _ => None,
        }
    }

    /// The status line a front end shows for this outcome.
    pub fn message(&self) -> String {
        match self {
            Outcome::Cooldown { wait_secs } => {
                format!("Please wait {wait_secs} second(s) before submitting again.")
            }
            Outcome::EmptyInput => "Please enter a note.".to_owned(),
            Outcome::Duplicate => {
                "Duplicate submission detected. Please modify your note before resubmitting."
                    .to_owned()
            }
            Outcome::RateLimited { .. } => {
                "You have reached the limit of 10 submissions per hour to this note, pubkey, or hashtag. Please try again later."
                    .to_owned()
            }
            Outcome::ProfilePublishFailed => {
                "Failed to send profile data. Please try again.".to_owned()
            }
            Outcome::ContentPublishFailed => {
                "No relays accepted the note. Please try again later.".to_owned()
            }
            Outcome::Published {
                accepted,
                total,
                hopped,
                ..
            } => {
                if *hopped {
                    "Anon note sent successfully via relay hop!".to_owned()
                } else {
                    format!("Anon note sent successfully via {accepted}/{total} relays!")
                }
            }
        }
    }
}

/// The submission pipeline and the session state it owns: relay pool,
/// persistent counters and the thread position of this session's posts.
pub struct Client<Io, R> {
    pool: RelayPool<Io>,
    storage: ClientStorage,
    thread: ThreadState,
    config: ClientConfig,
    rng: R,
}

impl Client<WsIo, ThreadRng> {
    /// A client over real websocket relays.
    pub fn websocket(config: ClientConfig, storage: ClientStorage) -> Self {
        Client::new(RelayPool::new(WsIo::connect), storage, config, rand::rng())
    }
}

impl<Io: RelayIo, R: Rng> Client<Io, R> {
    pub fn new(
        pool: RelayPool<Io>,
        storage: ClientStorage,
        config: ClientConfig,
        rng: R,
    ) -> Self {
        Client {
            pool,
            storage,
            thread: ThreadState::new(),
            config,
            rng,
        }
    }

    pub fn storage(&self) -> &ClientStorage {
        &self.storage
    }

    pub fn thread(&self) -> &ThreadState {
        &self.thread
    }

    pub fn pool_mut(&mut self) -> &mut RelayPool<Io> {
        &mut self.pool
    }

    /// Publish a new top-level note.
    pub fn submit(&mut self, text: &str, options: &SubmitOptions) -> Result<Outcome> {
        self.run_action(text, None, options)
    }

    /// Publish a reply to an existing note.
    pub fn reply(
        &mut self,
        text: &str,
        parent: &NoteId,
        options: &SubmitOptions,
    ) -> Result<Outcome> {
        self.run_action(text, Some(parent), options)
    }

    fn run_action(
        &mut self,
        text: &str,
        parent: Option<&NoteId>,
        options: &SubmitOptions,
    ) -> Result<Outcome> {
        let now = unix_time_secs();

        // one global cooldown across actions of every kind
        let last_submit = self.storage.get::<u64>(LAST_SUBMIT_TIME).unwrap_or(0);
        let elapsed = now.saturating_sub(last_submit);
        let cooldown = self.config.cooldown.as_secs();
        if elapsed < cooldown {
            return Ok(Outcome::Cooldown {
                wait_secs: cooldown - elapsed,
            });
        }

        let text = text.trim();
        if text.is_empty() {
            return Ok(Outcome::EmptyInput);
        }

        if !limits::check_duplicate(&self.storage, text, now) {
            return Ok(Outcome::Duplicate);
        }

        let annotation = annotate(&AnnotateRequest {
            text,
            parent,
            chain: options.reply_chain,
            thread: &self.thread,
        });

        // all-or-nothing pre-flight: a blocked target consumes nothing
        if let Some(target) = limits::check_rate_limits(&self.storage, &annotation.target_keys, now)
        {
            return Ok(Outcome::RateLimited { target });
        }
        limits::commit_rate_limits(&self.storage, &annotation.target_keys, now)?;

        if let Some(root) = annotation.new_root {
            self.thread.start_thread(root);
        }

        // fresh throwaway identity for this action only
        let keypair = FullKeypair::generate();
        let profile = mint_anon_profile(&mut self.rng, &keypair.pubkey);

        let relay_set = self.config.relay_set(options.use_tor_relays).to_vec();
        let total = relay_set.len();
        let deadline = self.config.publish_deadline;
        let strategy = if options.relay_hop {
            PublishStrategy::Hop
        } else {
            PublishStrategy::Direct
        };

        // the profile must reach at least one relay before the note
        // does, or viewers could never resolve the identity
        let profile_note = sign_note(
            NoteTemplate::new(NoteKind::Profile, profile.to_json()?, now),
            keypair.to_filled(),
        )?;
        if self.deliver(&profile_note, &relay_set, strategy, deadline) == 0 {
            warn!("no relay accepted the profile, aborting submission");
            return Ok(Outcome::ProfilePublishFailed);
        }

        let template =
            NoteTemplate::new(NoteKind::Text, annotation.text, now).tags(annotation.tags);
        let note = sign_note(template, keypair.to_filled())?;
        let event_id = note.id;

        // session bookkeeping happens at signing time; consumed quota
        // and thread position are not rolled back if delivery fails
        self.thread.note_published(event_id);
        subs::save_event_id(&self.storage, event_id)?;

        let accepted = self.deliver(&note, &relay_set, strategy, deadline);
        if accepted == 0 {
            return Ok(Outcome::ContentPublishFailed);
        }

        limits::record_submission(&self.storage, text, now)?;
        self.storage.put(LAST_SUBMIT_TIME, &now)?;
        subs::renew_reply_subscriptions(&mut self.pool, &self.storage);

        info!(
            "published {} to {}/{} relays",
            event_id.hex(),
            accepted,
            total
        );
        Ok(Outcome::Published {
            event_id,
            accepted,
            total,
            hopped: options.relay_hop,
        })
    }

    fn deliver(
        &mut self,
        note: &Note,
        relay_set: &[String],
        strategy: PublishStrategy,
        deadline: Duration,
    ) -> usize {
        match strategy {
            PublishStrategy::Direct => publish_direct(&mut self.pool, note, relay_set, deadline),
            PublishStrategy::Hop => {
                publish_hop(&mut self.pool, note, relay_set, deadline, &mut self.rng) as usize
            }
        }
    }
}
