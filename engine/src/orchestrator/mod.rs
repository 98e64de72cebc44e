//! AI request orchestrator
//!
//! Turns directives into prompts, sends them over the request channel one at
//! a time and hands the answers to the view: as anchored popups in
//! per-anchor mode, or as one results carousel in batch mode. The same
//! channel serves free-form questions and the whole-document audit.
//!
//! Requests are strictly sequential. A single loading indicator brackets each
//! run and is released on every exit path through `LoadingGuard`.

pub mod audit;
pub mod prompts;

pub use audit::{parse_audit_response, AuditFinding};

use std::sync::Arc;

use sdk::types::{AiRequest, ModelId};

use crate::config::AiConfig;
use crate::directive::{extract_from_document, Directive, DirectiveKind};
use crate::document::DocumentSource;
use crate::presentation::markup::popup_html;
use crate::presentation::{
    Carousel, LoadingGuard, ModalEvent, ModalItem, ModalKind, ModalManager, NotebookView, Notice,
};
use crate::relay::RequestChannel;
use crate::render::{escape_html, MarkupRenderer};
use crate::settings::{ProcessingMode, Settings};

/// One answered (or failed) directive in a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub kind: DirectiveKind,
    pub raw_content: String,
    pub rendered_response: String,
}

impl ModalItem for ResultItem {
    fn title(&self) -> String {
        format!("{}: {}", self.kind, self.raw_content)
    }

    fn body_html(&self) -> String {
        self.rendered_response.clone()
    }
}

/// How a directive run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No relay token; nothing was sent
    CredentialMissing,
    /// The document has no directives
    NoDirectives,
    /// Every directive was attempted
    Completed { answered: usize, failed: usize },
}

/// How an audit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    CredentialMissing,
    ChannelFailure,
    FormatError,
    NoFindings,
    /// The audit carousel was opened over this many findings
    Findings(usize),
}

/// Send one prompt and wait for its answer
///
/// Transport failures and non-success replies both yield `None`; the caller
/// cannot and should not tell them apart.
pub async fn request_answer(
    channel: &dyn RequestChannel,
    prompt: &str,
    model: &ModelId,
) -> Option<String> {
    let request = AiRequest::new(prompt, model.clone());
    match channel.send(&request).await {
        Ok(reply) => {
            let answer = reply.into_answer();
            if answer.is_none() {
                tracing::warn!("Relay answered without success for model {}", model);
            }
            answer
        }
        Err(e) => {
            tracing::warn!("Request channel failed: {}", e);
            None
        }
    }
}

pub struct Orchestrator {
    channel: Arc<dyn RequestChannel>,
    view: Arc<dyn NotebookView>,
    settings: Settings,
    ai: AiConfig,
    renderer: MarkupRenderer,
    modals: ModalManager,
}

impl Orchestrator {
    pub fn new(
        channel: Arc<dyn RequestChannel>,
        view: Arc<dyn NotebookView>,
        settings: Settings,
        ai: AiConfig,
    ) -> Self {
        Self {
            channel,
            view,
            settings,
            ai,
            renderer: MarkupRenderer::default(),
            modals: ModalManager::default(),
        }
    }

    /// Replace the rendering pipeline (e.g. with a different math renderer)
    pub fn with_renderer(mut self, renderer: MarkupRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn modals(&self) -> &ModalManager {
        &self.modals
    }

    fn credentials_present(&self) -> bool {
        if self.channel.has_credentials() {
            return true;
        }
        self.view
            .notify(&Notice::CredentialMissing("relay token".to_string()));
        false
    }

    /// Run every directive in `document` in the persisted processing mode
    pub async fn run_directives(&mut self, document: &dyn DocumentSource) -> RunOutcome {
        let mode = self.settings.processing_mode();
        self.run_directives_in(document, mode).await
    }

    /// Run every directive in `document` in an explicit processing mode
    pub async fn run_directives_in(
        &mut self,
        document: &dyn DocumentSource,
        mode: ProcessingMode,
    ) -> RunOutcome {
        if !self.credentials_present() {
            return RunOutcome::CredentialMissing;
        }

        let _loading = LoadingGuard::new(Arc::clone(&self.view));

        let directives = extract_from_document(document);
        if directives.is_empty() {
            tracing::info!("No directives found");
            self.view.notify(&Notice::NoDirectives);
            return RunOutcome::NoDirectives;
        }

        let model = self.settings.model(&self.ai);
        tracing::info!(
            "Processing {} directive(s) in {} mode with model {}",
            directives.len(),
            mode,
            model
        );

        match mode {
            ProcessingMode::PerAnchor => self.run_per_anchor(&directives, &model).await,
            ProcessingMode::Batch => {
                let (items, outcome) = self.collect_batch(&directives, &model).await;
                // Non-empty: one item per directive
                if let Some(carousel) = Carousel::new(items) {
                    self.modals.results.open(&*self.view, carousel);
                }
                outcome
            }
        }
    }

    async fn run_per_anchor(&self, directives: &[Directive], model: &ModelId) -> RunOutcome {
        let mut answered = 0;
        let mut failed = 0;

        for directive in directives {
            match self.answer_directive(directive, model).await {
                Some(rendered) => {
                    let html = popup_html(directive.kind, &rendered);
                    self.view.show_popup(&directive.anchor, directive.kind, &html);
                    answered += 1;
                }
                None => {
                    self.view.notify(&Notice::ChannelFailure {
                        context: directive_context(directive),
                    });
                    failed += 1;
                }
            }
        }

        RunOutcome::Completed { answered, failed }
    }

    async fn collect_batch(
        &self,
        directives: &[Directive],
        model: &ModelId,
    ) -> (Vec<ResultItem>, RunOutcome) {
        let mut items = Vec::with_capacity(directives.len());
        let mut failed = 0;

        for directive in directives {
            let rendered_response = match self.answer_directive(directive, model).await {
                Some(rendered) => rendered,
                None => {
                    failed += 1;
                    let notice = Notice::ChannelFailure {
                        context: directive_context(directive),
                    };
                    format!(
                        r#"<p class="quill-error">{}</p>"#,
                        escape_html(&notice.to_string())
                    )
                }
            };
            items.push(ResultItem {
                kind: directive.kind,
                raw_content: directive.raw_content.clone(),
                rendered_response,
            });
        }

        let answered = items.len() - failed;
        (items, RunOutcome::Completed { answered, failed })
    }

    async fn answer_directive(&self, directive: &Directive, model: &ModelId) -> Option<String> {
        tracing::debug!("Requesting {} at {}", directive.kind, directive.anchor);
        let prompt = prompts::directive_prompt(directive);
        let answer = request_answer(self.channel.as_ref(), &prompt, model).await?;
        tracing::debug!("Answered {} at {}", directive.kind, directive.anchor);
        Some(self.render_answer(directive.kind, &answer))
    }

    /// Render an answer according to what its directive asked for
    fn render_answer(&self, kind: DirectiveKind, answer: &str) -> String {
        let answer = answer.trim();
        match kind {
            DirectiveKind::Math if answer.contains('$') => self.renderer.render(answer),
            DirectiveKind::Math => self.renderer.render(&format!("$${}$$", answer)),
            DirectiveKind::Wolfram => format!(
                r#"<pre class="quill-code" data-lang="wolfram"><code>{}</code></pre>"#,
                escape_html(strip_code_fence(answer))
            ),
            DirectiveKind::Explain => self.renderer.render(answer),
        }
    }

    /// Ask a free-form question with the persisted model; returns rendered HTML
    pub async fn ask(&self, question: &str) -> Option<String> {
        if !self.credentials_present() {
            return None;
        }

        let _loading = LoadingGuard::new(Arc::clone(&self.view));
        let model = self.settings.model(&self.ai);
        let prompt = prompts::ask_prompt(question);

        match request_answer(self.channel.as_ref(), &prompt, &model).await {
            Some(answer) => Some(self.renderer.render(&answer)),
            None => {
                self.view.notify(&Notice::ChannelFailure {
                    context: "your question".to_string(),
                });
                None
            }
        }
    }

    /// Audit the whole document and present the findings
    pub async fn audit(&mut self, document: &dyn DocumentSource) -> AuditOutcome {
        if !self.credentials_present() {
            return AuditOutcome::CredentialMissing;
        }

        let answer = {
            let _loading = LoadingGuard::new(Arc::clone(&self.view));
            let model = self.settings.model(&self.ai);
            let prompt = prompts::audit_prompt(&document.full_text());
            request_answer(self.channel.as_ref(), &prompt, &model).await
        };

        let Some(answer) = answer else {
            self.view.notify(&Notice::ChannelFailure {
                context: "the audit".to_string(),
            });
            return AuditOutcome::ChannelFailure;
        };

        let findings = match parse_audit_response(&answer) {
            Ok(findings) => findings,
            Err(e) => {
                tracing::warn!("Audit answer rejected: {}", e);
                self.view.notify(&Notice::FormatError);
                return AuditOutcome::FormatError;
            }
        };

        let count = findings.len();
        match Carousel::new(findings) {
            Some(carousel) => {
                tracing::info!("Audit reported {} finding(s)", count);
                self.modals.audit.open(&*self.view, carousel);
                AuditOutcome::Findings(count)
            }
            None => {
                self.view.notify(&Notice::NoFindings);
                AuditOutcome::NoFindings
            }
        }
    }

    /// Forward a host event to the open modal of `kind`
    pub fn handle_modal_event(&mut self, kind: ModalKind, event: ModalEvent) -> bool {
        self.modals.dispatch(&*self.view, kind, event)
    }
}

fn directive_context(directive: &Directive) -> String {
    format!("[{}: {}]", directive.kind, directive.raw_content)
}

/// Drop a surrounding Markdown fence the model added despite being told not to
fn strip_code_fence(code: &str) -> &str {
    let Some(rest) = code.strip_prefix("```") else {
        return code;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => return code,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim_end()
}
