//! Form host.
//!
//! A [`Form`] owns the root `{state, data}` pair of one widget tree. Every
//! change goes through [`Form::apply`], either directly or through the
//! queue that rendered callbacks feed; queued actions are applied one at a
//! time in the order they were dispatched.

mod error;

use std::mem;

use serde::Serialize;
use tokio::sync::mpsc;

pub use error::FormError;

use crate::cache::{CacheKey, RecordCache};
use crate::client::RecordClient;
use crate::widget::{
    Dispatch, Editor, InitParams, RenderProps, Snapshot, ValidationError, View, Widget,
    WidgetStatus,
};

pub struct Form<W: Widget, Ctx = ()> {
    widget: W,
    ctx: Ctx,
    root: Snapshot<W::State, W::Data>,
    cache: RecordCache,
    queue: mpsc::UnboundedSender<W::Action>,
    pending: mpsc::UnboundedReceiver<W::Action>,
    submitted: bool,
    mutable: bool,
}

impl<W, Ctx> Form<W, Ctx>
where
    W: Editor<Ctx>,
    W::State: Default,
    W::Data: Default,
{
    /// Initializes `widget` over freshly loaded `data`.
    pub fn load(widget: W, ctx: Ctx, data: W::Data, cache: RecordCache) -> Self {
        let root = widget.initialize(data, &ctx, &InitParams::load());
        let (queue, pending) = mpsc::unbounded_channel();
        Self {
            widget,
            ctx,
            root,
            cache,
            queue,
            pending,
            submitted: false,
            mutable: true,
        }
    }

    pub fn data(&self) -> &W::Data {
        &self.root.data
    }

    pub fn state(&self) -> &W::State {
        &self.root.state
    }

    pub fn snapshot(&self) -> &Snapshot<W::State, W::Data> {
        &self.root
    }

    pub fn into_data(self) -> W::Data {
        self.root.data
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.mutable = !read_only;
    }

    /// Callback that queues actions for [`process_pending`](Self::process_pending).
    pub fn dispatcher(&self) -> Dispatch<W::Action> {
        let queue = self.queue.clone();
        Dispatch::new(move |action| {
            if queue.send(action).is_err() {
                tracing::debug!("Dropping action for a closed form");
            }
        })
    }

    /// Applies one action to the root.
    pub fn apply(&mut self, action: W::Action) -> Result<(), FormError> {
        if !self.mutable {
            return Err(FormError::ReadOnly);
        }
        tracing::debug!(?action, "Applying action");
        let state = mem::take(&mut self.root.state);
        let data = mem::take(&mut self.root.data);
        self.root = self.widget.reduce(state, data, action, &self.ctx);
        Ok(())
    }

    /// Applies queued actions in dispatch order. Returns how many were applied.
    pub fn process_pending(&mut self) -> Result<usize, FormError> {
        let mut applied = 0;
        while let Ok(action) = self.pending.try_recv() {
            self.apply(action)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Replaces the data with a freshly loaded value and clears the
    /// submission flag.
    pub fn reload(&mut self, data: W::Data) {
        self.root = self.widget.initialize(data, &self.ctx, &InitParams::load());
        self.submitted = false;
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        self.widget.validate(&self.root.data, &self.cache)
    }

    pub fn status(&self) -> WidgetStatus {
        WidgetStatus {
            mutable: self.mutable,
            validation: self.validate(),
            submitted: self.submitted,
        }
    }

    pub fn render(&self) -> View {
        let status = self.status();
        self.widget.render(RenderProps {
            state: &self.root.state,
            data: &self.root.data,
            ctx: &self.ctx,
            status: &status,
            dispatch: self.dispatcher(),
            cache: &self.cache,
        })
    }

    /// Errors that currently keep the form from being finalized.
    pub fn blocking_errors(&self) -> Vec<ValidationError> {
        self.validate()
            .into_iter()
            .filter(|error| error.blocks(self.submitted))
            .collect()
    }

    pub fn can_finalize(&self) -> bool {
        self.blocking_errors().is_empty()
    }

    /// Marks submission as attempted and checks that nothing blocks it.
    ///
    /// The flag stays set on failure so empty required fields start to show.
    pub fn submit(&mut self) -> Result<&W::Data, FormError> {
        self.submitted = true;
        let errors = self.blocking_errors();
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "Submission blocked");
            return Err(FormError::Blocked {
                count: errors.len(),
                errors,
            });
        }
        Ok(&self.root.data)
    }

    /// Submits and stores the data under `key`, then invalidates the
    /// cached copy so links to it refetch.
    pub async fn save(&mut self, client: &dyn RecordClient, key: &CacheKey) -> Result<(), FormError>
    where
        W::Data: Serialize,
    {
        let record = serde_json::to_value(self.submit()?)?;
        client.store_record(&key.entity, &key.id, record).await?;
        self.cache.invalidate(key);
        tracing::info!(%key, "Saved record");
        Ok(())
    }
}
