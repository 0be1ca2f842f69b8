//! Panels for the terminal run view

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;

use super::{Phase, Progress};

const PHASE_TRACK: &[Phase] = &[Phase::Drop, Phase::Create, Phase::Load, Phase::Transform];

/// Status panel showing the phase track and current info
pub struct StatusPanel {
    phase: Phase,
    info: String,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Drop,
            info: String::new(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    fn phase_style(&self, phase: Phase) -> Style {
        let current = PHASE_TRACK.iter().position(|p| *p == self.phase);
        let this = PHASE_TRACK.iter().position(|p| *p == phase);

        match (self.phase, current, this) {
            (Phase::Complete, _, _) => Style::default().fg(Color::Green),
            (_, Some(c), Some(t)) if t == c => Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            (_, Some(c), Some(t)) if t < c => Style::default().fg(Color::Green),
            _ => Style::default().fg(Color::DarkGray),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut track = vec![Span::raw(" ")];
        for (i, phase) in PHASE_TRACK.iter().enumerate() {
            if i > 0 {
                track.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
            }
            track.push(Span::styled(format!("{:?}", phase), self.phase_style(*phase)));
        }

        let headline_style = match self.phase {
            Phase::Complete => Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            _ => Style::default().fg(Color::White),
        };

        let lines = vec![
            Line::from(track),
            Line::from(vec![
                Span::raw(" "),
                Span::styled(self.phase.to_string(), headline_style),
            ]),
            Line::from(vec![
                Span::raw("   "),
                Span::styled(&self.info, Style::default().fg(Color::Gray)),
            ]),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Songplay Warehouse ")
            .border_style(Style::default().fg(Color::Blue));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Progress panel showing rows copied for the current load
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue));

        let Some(progress) = &self.progress else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let label = if progress.total > 0 {
            format!(
                "{}: {}/{} ({:.0}%)",
                progress.label,
                progress.current,
                progress.total,
                progress.ratio() * 100.0
            )
        } else {
            format!("{}: {}", progress.label, progress.current)
        };

        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio().min(1.0))
            .label(label);

        frame.render_widget(gauge, area);
    }
}

/// Activity log, newest entry at the bottom
pub struct LogPanel {
    entries: Vec<String>,
    max_entries: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: 200,
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Statements ")
            .border_style(Style::default().fg(Color::Blue));

        let visible_height = area.height.saturating_sub(2) as usize; // borders
        let start = self.entries.len().saturating_sub(visible_height);
        let newest = self.entries.len().saturating_sub(1);

        let items: Vec<ListItem> = self.entries[start..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if start + i == newest {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(Span::styled(format!(" {}", entry), style))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}
