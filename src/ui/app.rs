//! Main UI Application
//!
//! Coordinates rendering and input handling across all screens.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::app::{Dashboard, Notice, NoticeKind};
use crate::learn::{topics, QuizRun};
use crate::progression::{progress_percent, rank_for_xp, RANKS};
use crate::quests::{ClaimState, QuestClaimMachine, ValidationKind};
use crate::save::Theme;

/// How long a toast stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Shorten a wallet address for display: `abcd...wxyz`.
fn truncate_wallet(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        address.to_string()
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Quests,
    Leaderboard,
    Rewards,
    Learn,
    Settings,
}

impl Screen {
    const ALL: [Screen; 6] = [
        Screen::Dashboard,
        Screen::Quests,
        Screen::Leaderboard,
        Screen::Rewards,
        Screen::Learn,
        Screen::Settings,
    ];

    fn title(&self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::Quests => "Quests",
            Screen::Leaderboard => "Leaderboard",
            Screen::Rewards => "Rewards",
            Screen::Learn => "Learn",
            Screen::Settings => "Settings",
        }
    }
}

/// Where typed characters currently go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    /// Entering the wallet address to connect.
    ConnectAddress,
    /// Entering the proof URL for a quest card.
    QuestUrl { index: usize },
    /// Editing one of the profile form fields.
    ProfileField { field: usize },
}

const FORM_FIELDS: [&str; 4] = ["Display name", "X handle", "Discord", "Referred by (code)"];

/// Main UI application
pub struct App {
    screen: Screen,
    input_mode: InputMode,
    input_buffer: String,
    /// Cursor over the flat quest list (dailies then milestones)
    quest_cursor: usize,
    /// Cursor over quiz topics on the Learn screen
    topic_cursor: usize,
    /// Quiz in progress, if any
    quiz: Option<QuizRun>,
    /// Highlighted answer option inside a quiz
    quiz_cursor: usize,
    /// Profile form contents (name, twitter, discord, referred_by)
    form: [String; 4],
    form_cursor: usize,
    toast: Option<(Notice, Instant)>,
}

impl App {
    pub fn new() -> Self {
        Self {
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            quest_cursor: 0,
            topic_cursor: 0,
            quiz: None,
            quiz_cursor: 0,
            form: Default::default(),
            form_cursor: 0,
            toast: None,
        }
    }

    /// Advance timers and collect notices into the toast slot.
    pub fn tick(&mut self, now: Instant, dash: &mut Dashboard) {
        dash.tick(now);
        for notice in dash.take_notices() {
            self.toast = Some((notice, now + TOAST_DURATION));
        }
        if let Some((_, deadline)) = &self.toast {
            if now >= *deadline {
                self.toast = None;
            }
        }
    }

    fn toast_now(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.toast = Some((
            Notice {
                text: text.into(),
                kind,
            },
            Instant::now() + TOAST_DURATION,
        ));
    }

    fn switch_screen(&mut self, screen: Screen, dash: &mut Dashboard) {
        if self.screen == screen {
            return;
        }
        self.screen = screen;
        match screen {
            Screen::Leaderboard => dash.refresh_leaderboard(),
            Screen::Settings => self.prefill_form(dash),
            _ => {}
        }
    }

    fn next_screen(&mut self, dash: &mut Dashboard) {
        let idx = Screen::ALL
            .iter()
            .position(|s| *s == self.screen)
            .unwrap_or(0);
        let next = Screen::ALL[(idx + 1) % Screen::ALL.len()];
        self.switch_screen(next, dash);
    }

    fn prefill_form(&mut self, dash: &Dashboard) {
        if let Some(profile) = dash.store().profile() {
            self.form[0] = profile.username.clone().unwrap_or_default();
            self.form[1] = profile.twitter_handle.clone().unwrap_or_default();
            self.form[2] = profile.discord_handle.clone().unwrap_or_default();
            self.form[3] = profile.referred_by.clone().unwrap_or_default();
        } else {
            let cache = dash.cache();
            self.form[0] = cache.display_name.clone();
            self.form[1] = cache.twitter_handle.clone();
            self.form[2] = cache.discord_handle.clone();
            self.form[3].clear();
        }
        self.form_cursor = 0;
    }

    /// Handle a key press. Returns true when the app should quit.
    pub fn handle_input(&mut self, key: KeyEvent, dash: &mut Dashboard) -> Result<bool> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        // One-time risk disclaimer blocks everything until acknowledged
        if !dash.cache().risk_acknowledged {
            match key.code {
                KeyCode::Enter => dash.acknowledge_risk(),
                KeyCode::Char('q') => return Ok(true),
                _ => {}
            }
            return Ok(false);
        }

        if self.input_mode != InputMode::Normal {
            self.handle_text_entry(key, dash);
            return Ok(false);
        }

        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Tab => self.next_screen(dash),
            KeyCode::Char('1') if self.quiz.is_none() => {
                self.switch_screen(Screen::Dashboard, dash)
            }
            KeyCode::Char('2') if self.quiz.is_none() => self.switch_screen(Screen::Quests, dash),
            KeyCode::Char('3') if self.quiz.is_none() => {
                self.switch_screen(Screen::Leaderboard, dash)
            }
            KeyCode::Char('4') if self.quiz.is_none() => self.switch_screen(Screen::Rewards, dash),
            KeyCode::Char('5') if self.quiz.is_none() => self.switch_screen(Screen::Learn, dash),
            KeyCode::Char('6') if self.quiz.is_none() => self.switch_screen(Screen::Settings, dash),
            KeyCode::Char('c') if !dash.store().is_connected() => {
                self.input_buffer.clear();
                self.input_mode = InputMode::ConnectAddress;
            }
            KeyCode::Char('x') if dash.store().is_connected() => {
                dash.disconnect();
                self.toast_now(NoticeKind::Info, "Disconnected");
            }
            KeyCode::Char('f') => {
                if dash.store().is_connected() && !dash.session().is_active() {
                    dash.activate_session(Instant::now());
                    self.toast_now(NoticeKind::Info, "Activating fast-path session...");
                }
            }
            KeyCode::Char('r') => dash.refresh(),
            _ => match self.screen {
                Screen::Quests => self.handle_quests_key(key, dash),
                Screen::Learn => self.handle_learn_key(key, dash),
                Screen::Settings => self.handle_settings_key(key, dash),
                _ => {}
            },
        }
        Ok(false)
    }

    fn handle_text_entry(&mut self, key: KeyEvent, dash: &mut Dashboard) {
        match key.code {
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input_buffer);
                let mode = self.input_mode;
                self.input_mode = InputMode::Normal;
                match mode {
                    InputMode::ConnectAddress => {
                        let address = text.trim();
                        if !address.is_empty() {
                            dash.connect(address);
                        }
                    }
                    InputMode::QuestUrl { index } => {
                        dash.submit_quest_url(index, &text);
                    }
                    InputMode::ProfileField { field } => {
                        self.form[field] = text.trim().to_string();
                    }
                    InputMode::Normal => {}
                }
            }
            _ => {}
        }
    }

    fn handle_quests_key(&mut self, key: KeyEvent, dash: &mut Dashboard) {
        let count = dash.quest_count();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.quest_cursor = self.quest_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if count > 0 && self.quest_cursor + 1 < count {
                    self.quest_cursor += 1;
                }
            }
            KeyCode::Enter => self.quest_action(dash),
            KeyCode::Char('y') => {
                // Show the referral link for sharing
                match dash.referral_link() {
                    Some(link) => self.toast_now(NoticeKind::Info, format!("Share: {}", link)),
                    None => self.toast_now(
                        NoticeKind::Error,
                        "Connect and set up your profile to get a referral link",
                    ),
                }
            }
            _ => {}
        }
    }

    /// Context-sensitive action on the selected quest card.
    fn quest_action(&mut self, dash: &mut Dashboard) {
        let index = self.quest_cursor;
        let state = match dash.quest(index) {
            Some(m) => m.state().clone(),
            None => return,
        };
        let now = Instant::now();
        match state {
            ClaimState::Idle => {
                if let Some(link) = dash.start_quest(index, now) {
                    self.toast_now(NoticeKind::Info, format!("Open in browser: {}", link));
                }
            }
            ClaimState::Verifying { deadline: None } => {
                self.input_buffer.clear();
                self.input_mode = InputMode::QuestUrl { index };
            }
            ClaimState::ReferralCheck { .. } => dash.verify_quest_referrals(index),
            ClaimState::Verified => dash.claim_quest(index, now),
            ClaimState::Crediting { next_try: None, .. } => {
                dash.retry_quest_credit(index, now);
                self.toast_now(NoticeKind::Info, "Retrying XP credit...");
            }
            _ => {}
        }
    }

    fn handle_learn_key(&mut self, key: KeyEvent, dash: &mut Dashboard) {
        if let Some(run) = &mut self.quiz {
            match key.code {
                KeyCode::Esc => {
                    self.quiz = None;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    if run.selected().is_none() {
                        self.quiz_cursor = self.quiz_cursor.saturating_sub(1);
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if run.selected().is_none()
                        && self.quiz_cursor + 1 < run.question().options.len()
                    {
                        self.quiz_cursor += 1;
                    }
                }
                KeyCode::Enter => {
                    if run.is_finished() {
                        if let Some(run) = self.quiz.take() {
                            dash.finish_quiz(&run);
                        }
                    } else if run.selected().is_none() {
                        run.answer(self.quiz_cursor);
                    } else {
                        run.next();
                        self.quiz_cursor = 0;
                    }
                }
                _ => {}
            }
            return;
        }

        let all = topics();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.topic_cursor = self.topic_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.topic_cursor + 1 < all.len() {
                    self.topic_cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(topic) = all.into_iter().nth(self.topic_cursor) {
                    if dash.cache().has_passed_quiz(topic.id) {
                        self.toast_now(NoticeKind::Info, "Already passed. Pick another topic!");
                    } else {
                        self.quiz = Some(QuizRun::new(topic));
                        self.quiz_cursor = 0;
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent, dash: &mut Dashboard) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.form_cursor = self.form_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.form_cursor + 1 < FORM_FIELDS.len() {
                    self.form_cursor += 1;
                }
            }
            KeyCode::Enter => {
                // The referrer field locks once set
                let locked = self.form_cursor == 3
                    && dash
                        .store()
                        .profile()
                        .map(|p| p.referred_by.is_some())
                        .unwrap_or(false);
                if locked {
                    self.toast_now(NoticeKind::Info, "Referrer is already set");
                } else {
                    self.input_buffer = self.form[self.form_cursor].clone();
                    self.input_mode = InputMode::ProfileField {
                        field: self.form_cursor,
                    };
                }
            }
            KeyCode::Char('s') => {
                if dash.store().is_connected() {
                    let [name, twitter, discord, referred_by] = &self.form;
                    dash.save_profile(name, twitter, discord, referred_by);
                } else {
                    self.toast_now(NoticeKind::Error, "Connect a wallet first");
                }
            }
            KeyCode::Char('t') => {
                dash.toggle_theme();
            }
            _ => {}
        }
    }

    // ---- rendering -------------------------------------------------------

    fn accent(theme: Theme) -> Color {
        match theme {
            Theme::Dark => Color::Magenta,
            Theme::Light => Color::Blue,
        }
    }

    fn dim(theme: Theme) -> Color {
        match theme {
            Theme::Dark => Color::DarkGray,
            Theme::Light => Color::Gray,
        }
    }

    pub fn render(&self, frame: &mut Frame, dash: &Dashboard) {
        frame.render_widget(Clear, frame.area());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0], dash);
        self.render_tabs(frame, chunks[1], dash);
        match self.screen {
            Screen::Dashboard => self.render_dashboard(frame, chunks[2], dash),
            Screen::Quests => self.render_quests(frame, chunks[2], dash),
            Screen::Leaderboard => self.render_leaderboard(frame, chunks[2], dash),
            Screen::Rewards => self.render_rewards(frame, chunks[2], dash),
            Screen::Learn => self.render_learn(frame, chunks[2], dash),
            Screen::Settings => self.render_settings(frame, chunks[2], dash),
        }
        self.render_footer(frame, chunks[3], dash);

        if self.input_mode != InputMode::Normal {
            self.render_input_popup(frame, dash);
        }
        if let Some((notice, _)) = &self.toast {
            self.render_toast(frame, notice);
        }
        if !dash.cache().risk_acknowledged {
            self.render_risk_modal(frame, dash);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, dash: &Dashboard) {
        let theme = dash.cache().theme;
        let accent = Self::accent(theme);
        let store = dash.store();

        let identity = match store.address() {
            Some(address) => {
                let name = store
                    .profile()
                    .and_then(|p| p.username.clone())
                    .unwrap_or_else(|| truncate_wallet(address));
                let session = if dash.session().is_active() {
                    "  ⚡fast"
                } else if dash.session().is_activating() {
                    "  ⚡..."
                } else {
                    ""
                };
                format!("{}{}", name, session)
            }
            None => "not connected".to_string(),
        };

        let info = rank_for_xp(store.xp());
        let line = Line::from(vec![
            Span::styled(
                " ✦ Daily Magic ",
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(identity, Style::default().fg(Color::White)),
            Span::raw("  |  "),
            Span::styled(
                format!("{} XP", store.xp()),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw("  "),
            Span::styled(info.name, Style::default().fg(accent)),
        ]);
        let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect, dash: &Dashboard) {
        let accent = Self::accent(dash.cache().theme);
        let mut spans = vec![Span::raw(" ")];
        for (i, screen) in Screen::ALL.iter().enumerate() {
            let label = format!("[{}] {}", i + 1, screen.title());
            let style = if *screen == self.screen {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Self::dim(dash.cache().theme))
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw("  "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_dashboard(&self, frame: &mut Frame, area: Rect, dash: &Dashboard) {
        let theme = dash.cache().theme;
        let accent = Self::accent(theme);
        let store = dash.store();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(3),
            ])
            .split(area);

        let info = rank_for_xp(store.xp());
        let next = match info.next_threshold {
            Some(next) => format!("{} / {} XP to next rank", store.xp(), next),
            None => format!("{} XP — top of the ladder", store.xp()),
        };
        let rank_lines = vec![
            Line::from(Span::styled(
                info.name,
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(next, Style::default().fg(Color::White))),
        ];
        let rank_card = Paragraph::new(rank_lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Rank "));
        frame.render_widget(rank_card, chunks[0]);

        let pct = progress_percent(store.xp(), &info);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" Progress "))
            .gauge_style(Style::default().fg(accent))
            .percent(pct.round() as u16);
        frame.render_widget(gauge, chunks[1]);

        let mut lines = Vec::new();
        if store.is_connected() {
            let total = dash.quest_count();
            let done = (0..total)
                .filter(|i| dash.quest(*i).map(|m| m.is_claimed()).unwrap_or(false))
                .count();
            lines.push(Line::from(format!("Quests claimed: {}/{}", done, total)));
            if let Some(code) = store.referral_code() {
                lines.push(Line::from(format!("Referral code: {}", code)));
            }
            if !dash.session().is_active() {
                lines.push(Line::from(Span::styled(
                    "Press f to activate the fast-path session (skips quest verification delays)",
                    Style::default().fg(Self::dim(theme)),
                )));
            }
        } else {
            lines.push(Line::from(
                "Press c to connect a wallet and start questing.",
            ));
        }
        let summary = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Today "));
        frame.render_widget(summary, chunks[2]);
    }

    fn quest_badge(machine: &QuestClaimMachine) -> (String, Color) {
        match machine.state() {
            ClaimState::Idle => ("start ⏎".into(), Color::White),
            ClaimState::Verifying { deadline: Some(_) } => ("verifying...".into(), Color::Yellow),
            ClaimState::Verifying { deadline: None } => ("paste link ⏎".into(), Color::Cyan),
            ClaimState::ReferralCheck { last_count } => {
                let tally = last_count
                    .map(|n| format!("invited {}/3, verify ⏎", n))
                    .unwrap_or_else(|| "verify ⏎".into());
                (tally, Color::Cyan)
            }
            ClaimState::Verified => ("claim! ⏎".into(), Color::Green),
            ClaimState::Crediting {
                next_try: Some(_), ..
            } => ("crediting...".into(), Color::Yellow),
            ClaimState::Crediting { next_try: None, .. } => ("retry credit ⏎".into(), Color::Red),
            ClaimState::Claimed => ("✓ claimed".into(), Color::Green),
        }
    }

    fn render_quests(&self, frame: &mut Frame, area: Rect, dash: &Dashboard) {
        let theme = dash.cache().theme;
        let accent = Self::accent(theme);

        let mut lines = Vec::new();
        let mut flat = 0usize;
        for (section, machines) in [
            (" Daily Rituals ", dash.daily_quests()),
            (" Milestones ", dash.milestone_quests()),
        ] {
            lines.push(Line::from(Span::styled(
                section,
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )));
            for machine in machines {
                let def = machine.def();
                let selected = flat == self.quest_cursor;
                let marker = if selected { "▸ " } else { "  " };
                let (badge, badge_color) = Self::quest_badge(machine);
                let title_style = if selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                lines.push(Line::from(vec![
                    Span::raw(marker),
                    Span::styled(format!("{:<28}", def.title), title_style),
                    Span::styled(
                        format!("{:>5} XP  ", def.xp),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(badge, Style::default().fg(badge_color)),
                ]));
                if selected {
                    lines.push(Line::from(Span::styled(
                        format!("    {}", def.description),
                        Style::default().fg(Self::dim(theme)),
                    )));
                    if matches!(def.validation, ValidationKind::ReferralGate { .. }) {
                        lines.push(Line::from(Span::styled(
                            "    y: show your referral link",
                            Style::default().fg(Self::dim(theme)),
                        )));
                    }
                }
                flat += 1;
            }
            lines.push(Line::from(""));
        }

        let board =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Quest Board "));
        frame.render_widget(board, area);
    }

    fn render_leaderboard(&self, frame: &mut Frame, area: Rect, dash: &Dashboard) {
        let accent = Self::accent(dash.cache().theme);
        let own = dash.store().address().map(str::to_string);

        let mut lines = vec![Line::from(Span::styled(
            format!("{:>4}  {:<24} {:>8}", "#", "Mage", "XP"),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for (i, entry) in dash.leaderboard().iter().enumerate() {
            let name = entry
                .username
                .clone()
                .or_else(|| entry.twitter_handle.clone().map(|h| format!("@{}", h)))
                .unwrap_or_else(|| truncate_wallet(&entry.wallet_address));
            let is_self = own.as_deref() == Some(entry.wallet_address.as_str());
            let style = if is_self {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let marker = if is_self { " ← you" } else { "" };
            lines.push(Line::from(Span::styled(
                format!("{:>4}  {:<24} {:>8}{}", i + 1, name, entry.xp, marker),
                style,
            )));
        }
        if dash.leaderboard().is_empty() {
            lines.push(Line::from("No rankings yet."));
        }

        let board =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Top Mages "));
        frame.render_widget(board, area);
    }

    fn render_rewards(&self, frame: &mut Frame, area: Rect, dash: &Dashboard) {
        let theme = dash.cache().theme;
        let accent = Self::accent(theme);
        let store = dash.store();
        let info = rank_for_xp(store.xp());

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "✦ Certificate of Magical Achievement ✦",
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        match store.address() {
            Some(address) => {
                let name = store
                    .profile()
                    .and_then(|p| p.username.clone())
                    .unwrap_or_else(|| truncate_wallet(address));
                lines.push(Line::from(format!("This certifies that {}", name)));
                lines.push(Line::from(vec![
                    Span::raw("has attained the rank of "),
                    Span::styled(
                        info.name,
                        Style::default().fg(accent).add_modifier(Modifier::BOLD),
                    ),
                ]));
                lines.push(Line::from(format!("with {} XP earned", store.xp())));
            }
            None => lines.push(Line::from("Connect a wallet to see your certificate.")),
        }
        lines.push(Line::from(""));

        let mut ladder = vec![Line::from(Span::styled(
            "Rank ladder",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for rank in RANKS.iter() {
            let earned = store.is_connected() && store.xp() >= rank.threshold;
            let (mark, style) = if earned {
                ("✓", Style::default().fg(Color::Green))
            } else {
                ("·", Style::default().fg(Self::dim(theme)))
            };
            ladder.push(Line::from(Span::styled(
                format!("{} {:<16} {:>5} XP", mark, rank.name, rank.threshold),
                style,
            )));
        }

        let cache = dash.cache();
        let mut bonus_lines = vec![Line::from(Span::styled(
            "Quiz bonuses",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if cache.quiz_bonuses.is_empty() {
            bonus_lines.push(Line::from(Span::styled(
                "None yet. Pass quizzes on the Learn tab!",
                Style::default().fg(Self::dim(theme)),
            )));
        } else {
            for bonus in &cache.quiz_bonuses {
                bonus_lines.push(Line::from(format!("+{} XP  {}", bonus.xp, bonus.topic_id)));
            }
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(4)])
            .split(area);
        let cert = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(cert, chunks[0]);

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        frame.render_widget(
            Paragraph::new(ladder).block(Block::default().borders(Borders::ALL)),
            cols[0],
        );
        frame.render_widget(
            Paragraph::new(bonus_lines).block(Block::default().borders(Borders::ALL)),
            cols[1],
        );
    }

    fn render_learn(&self, frame: &mut Frame, area: Rect, dash: &Dashboard) {
        let theme = dash.cache().theme;
        let accent = Self::accent(theme);

        if let Some(run) = &self.quiz {
            let mut lines = vec![
                Line::from(Span::styled(
                    run.topic().title,
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ];
            if run.is_finished() {
                let verdict = if run.passed() {
                    Span::styled(
                        format!("Passed! {}/5 — press ⏎ to collect", run.score()),
                        Style::default().fg(Color::Green),
                    )
                } else {
                    Span::styled(
                        format!("Scored {}/5 — need 3 to pass. Press ⏎.", run.score()),
                        Style::default().fg(Color::Red),
                    )
                };
                lines.push(Line::from(verdict));
            } else {
                lines.push(Line::from(format!(
                    "Question {}/5 — score {}",
                    run.question_number(),
                    run.score()
                )));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    run.question().prompt,
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
                for (i, option) in run.question().options.iter().enumerate() {
                    let marker = if i == self.quiz_cursor { "▸ " } else { "  " };
                    let style = match run.selected() {
                        Some(sel) => {
                            if i == run.question().correct {
                                Style::default().fg(Color::Green)
                            } else if i == sel {
                                Style::default().fg(Color::Red)
                            } else {
                                Style::default().fg(Self::dim(theme))
                            }
                        }
                        None if i == self.quiz_cursor => {
                            Style::default().fg(accent).add_modifier(Modifier::BOLD)
                        }
                        None => Style::default().fg(Color::White),
                    };
                    lines.push(Line::from(Span::styled(
                        format!("{}{}", marker, option),
                        style,
                    )));
                }
                lines.push(Line::from(""));
                let hint = if run.selected().is_none() {
                    "↑/↓ choose, ⏎ answer, Esc abandon"
                } else {
                    "⏎ next question"
                };
                lines.push(Line::from(Span::styled(
                    hint,
                    Style::default().fg(Self::dim(theme)),
                )));
            }
            let quiz = Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Quiz "));
            frame.render_widget(quiz, area);
            return;
        }

        let mut lines = vec![Line::from(Span::styled(
            "Pass a quiz (3/5) to earn bonus XP. One pass per topic.",
            Style::default().fg(Self::dim(theme)),
        ))];
        lines.push(Line::from(""));
        for (i, topic) in topics().iter().enumerate() {
            let selected = i == self.topic_cursor;
            let marker = if selected { "▸ " } else { "  " };
            let passed = dash.cache().has_passed_quiz(topic.id);
            let badge = if passed { "✓ passed" } else { "" };
            let style = if selected {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{:<24}", topic.title), style),
                Span::styled(
                    format!("+{} XP  ", topic.xp_reward),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(badge, Style::default().fg(Color::Green)),
            ]));
            if selected {
                lines.push(Line::from(Span::styled(
                    format!("    {}", topic.description),
                    Style::default().fg(Self::dim(theme)),
                )));
            }
        }

        let list = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Learn "));
        frame.render_widget(list, area);
    }

    fn render_settings(&self, frame: &mut Frame, area: Rect, dash: &Dashboard) {
        let theme = dash.cache().theme;
        let accent = Self::accent(theme);

        let mut lines = Vec::new();
        for (i, label) in FORM_FIELDS.iter().enumerate() {
            let selected = i == self.form_cursor;
            let marker = if selected { "▸ " } else { "  " };
            let locked = i == 3
                && dash
                    .store()
                    .profile()
                    .map(|p| p.referred_by.is_some())
                    .unwrap_or(false);
            let value = if self.form[i].is_empty() {
                "—".to_string()
            } else {
                self.form[i].clone()
            };
            let suffix = if locked { " (locked)" } else { "" };
            let style = if selected {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{:<20}", label), style),
                Span::styled(value, Style::default().fg(Color::White)),
                Span::styled(suffix, Style::default().fg(Self::dim(theme))),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Theme: {:?}  (t to toggle)", theme),
            Style::default().fg(Self::dim(theme)),
        )));
        lines.push(Line::from(Span::styled(
            "⏎ edit field · s save profile",
            Style::default().fg(Self::dim(theme)),
        )));
        if !dash.store().is_connected() {
            lines.push(Line::from(Span::styled(
                "Connect a wallet (c) before saving.",
                Style::default().fg(Color::Yellow),
            )));
        }

        let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Profile "));
        frame.render_widget(form, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, dash: &Dashboard) {
        let theme = dash.cache().theme;
        let connect_hint = if dash.store().is_connected() {
            "x disconnect"
        } else {
            "c connect"
        };
        let hints = format!(
            " tab/1-6 screens · {} · f session · r refresh · q quit · v{}",
            connect_hint,
            env!("CARGO_PKG_VERSION")
        );
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                hints,
                Style::default().fg(Self::dim(theme)),
            ))),
            area,
        );
    }

    fn render_input_popup(&self, frame: &mut Frame, dash: &Dashboard) {
        let accent = Self::accent(dash.cache().theme);
        let title = match self.input_mode {
            InputMode::ConnectAddress => " Wallet address ",
            InputMode::QuestUrl { .. } => " Paste your X post link ",
            InputMode::ProfileField { field } => FORM_FIELDS[field],
            InputMode::Normal => "",
        };
        let area = centered_rect(60, 3, frame.area());
        frame.render_widget(Clear, area);
        let input = Paragraph::new(Line::from(vec![
            Span::raw(self.input_buffer.as_str()),
            Span::styled("▌", Style::default().fg(accent)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(title),
        );
        frame.render_widget(input, area);
    }

    fn render_toast(&self, frame: &mut Frame, notice: &Notice) {
        let color = match notice.kind {
            NoticeKind::Info => Color::Cyan,
            NoticeKind::Success => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        let width = (notice.text.chars().count() as u16 + 4)
            .min(frame.area().width.saturating_sub(2))
            .max(10);
        let area = Rect {
            x: frame.area().width.saturating_sub(width + 1),
            y: frame.area().height.saturating_sub(4),
            width,
            height: 3,
        };
        frame.render_widget(Clear, area);
        let toast = Paragraph::new(Line::from(notice.text.as_str()))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
        frame.render_widget(toast, area);
    }

    fn render_risk_modal(&self, frame: &mut Frame, dash: &Dashboard) {
        let accent = Self::accent(dash.cache().theme);
        let area = centered_rect(64, 10, frame.area());
        frame.render_widget(Clear, area);
        let lines = vec![
            Line::from(Span::styled(
                "Before you begin",
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Daily Magic is a community dashboard. XP and ranks are"),
            Line::from("for fun and carry no monetary value. Links open external"),
            Line::from("sites; never share your seed phrase with anyone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press ⏎ to continue",
                Style::default().fg(Color::Green),
            )),
        ];
        let modal = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(accent)),
            );
        frame.render_widget(modal, area);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// A centered rect of fixed height and percentage width.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::LocalCache;
    use crate::service::MemoryService;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn dash() -> Dashboard {
        let mut cache = LocalCache::new();
        cache.risk_acknowledged = true;
        Dashboard::new(Arc::new(MemoryService::new()), cache)
    }

    #[test]
    fn test_risk_modal_blocks_until_enter() {
        let mut dash = Dashboard::new(Arc::new(MemoryService::new()), LocalCache::new());
        let mut app = App::new();

        app.handle_input(key(KeyCode::Tab), &mut dash).unwrap();
        assert_eq!(app.screen, Screen::Dashboard);

        app.handle_input(key(KeyCode::Enter), &mut dash).unwrap();
        assert!(dash.cache().risk_acknowledged);
        app.handle_input(key(KeyCode::Tab), &mut dash).unwrap();
        assert_eq!(app.screen, Screen::Quests);
    }

    #[test]
    fn test_connect_via_text_entry() {
        let mut dash = dash();
        let mut app = App::new();

        app.handle_input(key(KeyCode::Char('c')), &mut dash).unwrap();
        for c in "wallet1".chars() {
            app.handle_input(key(KeyCode::Char(c)), &mut dash).unwrap();
        }
        app.handle_input(key(KeyCode::Enter), &mut dash).unwrap();
        assert!(dash.store().is_connected());
        assert_eq!(dash.store().address(), Some("wallet1"));
    }

    #[test]
    fn test_quest_cursor_stays_in_bounds() {
        let mut dash = dash();
        let mut app = App::new();
        app.switch_screen(Screen::Quests, &mut dash);

        app.handle_input(key(KeyCode::Up), &mut dash).unwrap();
        assert_eq!(app.quest_cursor, 0);
        for _ in 0..100 {
            app.handle_input(key(KeyCode::Down), &mut dash).unwrap();
        }
        assert_eq!(app.quest_cursor, dash.quest_count() - 1);
    }

    #[test]
    fn test_quiz_flow_through_keys() {
        let mut dash = dash();
        let mut app = App::new();
        app.handle_input(key(KeyCode::Char('c')), &mut dash).unwrap();
        for c in "wallet1".chars() {
            app.handle_input(key(KeyCode::Char(c)), &mut dash).unwrap();
        }
        app.handle_input(key(KeyCode::Enter), &mut dash).unwrap();
        app.switch_screen(Screen::Learn, &mut dash);

        // Start the first topic and answer every question with the top option
        app.handle_input(key(KeyCode::Enter), &mut dash).unwrap();
        assert!(app.quiz.is_some());
        for _ in 0..5 {
            app.handle_input(key(KeyCode::Enter), &mut dash).unwrap(); // answer
            app.handle_input(key(KeyCode::Enter), &mut dash).unwrap(); // next
        }
        assert!(app.quiz.as_ref().map(|r| r.is_finished()).unwrap_or(false));

        // Collect the result; the run is consumed either way
        app.handle_input(key(KeyCode::Enter), &mut dash).unwrap();
        assert!(app.quiz.is_none());
    }

    #[test]
    fn test_truncate_wallet() {
        assert_eq!(truncate_wallet("short"), "short");
        assert_eq!(
            truncate_wallet("8xKqv3mP9tYw2zRbNfGhJdLcVeSaUi4o"),
            "8xKq...Ui4o"
        );
    }
}
