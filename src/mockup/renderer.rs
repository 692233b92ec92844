use super::gemini::InfographicData;

pub const MIN_ZOOM: u32 = 50;
pub const MAX_ZOOM: u32 = 200;
const ZOOM_STEP: u32 = 10;

const CANVAS_WIDTH: u32 = 960;

/// The five diagram styles the preview offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagramKind {
    #[default]
    HorizontalTimeline,
    VerticalSteps,
    SwotMatrix,
    Funnel,
    OrgChart,
}

impl DiagramKind {
    pub const ALL: [DiagramKind; 5] = [
        DiagramKind::HorizontalTimeline,
        DiagramKind::VerticalSteps,
        DiagramKind::SwotMatrix,
        DiagramKind::Funnel,
        DiagramKind::OrgChart,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DiagramKind::HorizontalTimeline => "横向时间轴",
            DiagramKind::VerticalSteps => "垂直步骤图",
            DiagramKind::SwotMatrix => "SWOT分析",
            DiagramKind::Funnel => "漏斗图",
            DiagramKind::OrgChart => "组织架构图",
        }
    }
}

/// Local interaction state of the preview pane. Never escapes the
/// component.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub zoom: u32,
    pub dropdown_open: bool,
    pub kind: DiagramKind,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 100,
            dropdown_open: false,
            kind: DiagramKind::default(),
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(ZOOM_STEP).max(MIN_ZOOM);
    }

    pub fn fit(&mut self) {
        self.zoom = 100;
    }

    pub fn toggle_dropdown(&mut self) {
        self.dropdown_open = !self.dropdown_open;
    }

    /// Picking a kind also closes the dropdown, like any menu.
    pub fn select_kind(&mut self, kind: DiagramKind) {
        self.kind = kind;
        self.dropdown_open = false;
    }
}

/// Pure mapping from timeline data and a diagram kind to an SVG document.
pub fn render(data: &InfographicData, kind: DiagramKind) -> String {
    let body = match kind {
        DiagramKind::HorizontalTimeline => render_horizontal(data),
        DiagramKind::VerticalSteps => render_vertical(data),
        DiagramKind::SwotMatrix => render_swot(data),
        DiagramKind::Funnel => render_funnel(data),
        DiagramKind::OrgChart => render_org_chart(data),
    };

    let height = body_height(data, kind);
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n",
        w = CANVAS_WIDTH,
        h = height
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"44\" text-anchor=\"middle\" font-size=\"24\" font-weight=\"bold\" fill=\"#1f2937\">{}</text>\n",
        CANVAS_WIDTH / 2,
        escape(&data.title)
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"72\" text-anchor=\"middle\" font-size=\"14\" fill=\"#6b7280\">{}</text>\n",
        CANVAS_WIDTH / 2,
        escape(&data.subtitle)
    ));
    svg.push_str(&body);
    svg.push_str("</svg>\n");
    svg
}

fn body_height(data: &InfographicData, kind: DiagramKind) -> u32 {
    let n = data.stages.len() as u32;
    match kind {
        DiagramKind::HorizontalTimeline => 340,
        DiagramKind::VerticalSteps => 110 + n * 100,
        DiagramKind::SwotMatrix => 110 + 2 * 180,
        DiagramKind::Funnel => 110 + n * 80,
        DiagramKind::OrgChart => 340,
    }
}

fn render_horizontal(data: &InfographicData) -> String {
    let n = data.stages.len().max(1) as u32;
    let margin = 40;
    let column = (CANVAS_WIDTH - 2 * margin) / n;
    let bar_y = 220;
    let mut out = String::new();

    for (i, stage) in data.stages.iter().enumerate() {
        let x = margin + i as u32 * column;

        out.push_str(&format!(
            "  <text x=\"{}\" y=\"130\" font-size=\"12\" fill=\"#6b7280\">{}</text>\n",
            x + 8,
            escape(&stage.description)
        ));
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"160\" font-size=\"20\" font-weight=\"bold\" fill=\"#1f2937\">{}</text>\n",
            x + 8,
            escape(&stage.value)
        ));
        out.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"12\" rx=\"2\" fill=\"{}\"/>\n",
            x,
            bar_y,
            column - 16,
            escape(&stage.color)
        ));
        // Arrow head toward the next stage.
        if (i as u32) < n - 1 {
            let tip_x = x + column - 2;
            out.push_str(&format!(
                "  <polygon points=\"{x0},{y0} {x1},{y1} {x0},{y2}\" fill=\"{c}\"/>\n",
                x0 = x + column - 16,
                y0 = bar_y - 6,
                x1 = tip_x,
                y1 = bar_y + 6,
                y2 = bar_y + 18,
                c = escape(&stage.color)
            ));
        }
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" font-weight=\"bold\" fill=\"#374151\">{}</text>\n",
            x + 8,
            bar_y + 36,
            escape(&stage.name)
        ));
    }
    out
}

fn render_vertical(data: &InfographicData) -> String {
    let mut out = String::new();
    let left = 80;
    let row_h = 100;

    for (i, stage) in data.stages.iter().enumerate() {
        let y = 120 + i as u32 * row_h;

        if i < data.stages.len() - 1 {
            out.push_str(&format!(
                "  <line x1=\"{x}\" y1=\"{y0}\" x2=\"{x}\" y2=\"{y1}\" stroke=\"#e5e7eb\" stroke-width=\"4\"/>\n",
                x = left,
                y0 = y + 24,
                y1 = y + row_h
            ));
        }
        out.push_str(&format!(
            "  <circle cx=\"{}\" cy=\"{}\" r=\"24\" fill=\"{}\"/>\n",
            left,
            y,
            escape(&stage.color)
        ));
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"16\" font-weight=\"bold\" fill=\"#ffffff\">{}</text>\n",
            left,
            y + 6,
            i + 1
        ));
        out.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"72\" rx=\"12\" fill=\"#f9fafb\" stroke=\"#e5e7eb\"/>\n",
            left + 48,
            y - 36,
            CANVAS_WIDTH - left - 48 - 60,
        ));
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"16\" font-weight=\"bold\" fill=\"#1f2937\">{}</text>\n",
            left + 68,
            y - 10,
            escape(&stage.name)
        ));
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"13\" font-weight=\"bold\" fill=\"#4b5563\">{}</text>\n",
            CANVAS_WIDTH - 80,
            y - 10,
            escape(&stage.value)
        ));
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"#6b7280\">{}</text>\n",
            left + 68,
            y + 14,
            escape(&stage.description)
        ));
    }
    out
}

fn render_swot(data: &InfographicData) -> String {
    let mut out = String::new();
    let cell_w = 420;
    let cell_h = 160;
    let gap = 20;
    let origin_x = (CANVAS_WIDTH - 2 * cell_w - gap) / 2;
    let origin_y = 110;

    // The matrix takes the first four stages as its quadrants.
    for (i, stage) in data.stages.iter().take(4).enumerate() {
        let col = (i % 2) as u32;
        let row = (i / 2) as u32;
        let x = origin_x + col * (cell_w + gap);
        let y = origin_y + row * (cell_h + gap);

        out.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"12\" fill=\"{c}\" fill-opacity=\"0.12\" stroke=\"{c}\" stroke-width=\"2\"/>\n",
            x,
            y,
            cell_w,
            cell_h,
            c = escape(&stage.color)
        ));
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"16\" font-weight=\"bold\" fill=\"#1f2937\">{}</text>\n",
            x + 20,
            y + 34,
            escape(&stage.name)
        ));
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"#6b7280\">{}</text>\n",
            x + 20,
            y + 62,
            escape(&stage.description)
        ));
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"13\" font-weight=\"bold\" fill=\"#4b5563\">{}</text>\n",
            x + 20,
            y + cell_h - 20,
            escape(&stage.value)
        ));
    }
    out
}

fn render_funnel(data: &InfographicData) -> String {
    let mut out = String::new();
    let n = data.stages.len().max(1) as u32;
    let top_w: u32 = 700;
    let bottom_w: u32 = 220;
    let row_h = 80;
    let shrink = if n > 1 { (top_w - bottom_w) / n } else { 0 };
    let center = CANVAS_WIDTH / 2;

    for (i, stage) in data.stages.iter().enumerate() {
        let i = i as u32;
        let w0 = top_w - i * shrink;
        let w1 = top_w - (i + 1) * shrink;
        let y0 = 110 + i * row_h;
        let y1 = y0 + row_h - 8;

        out.push_str(&format!(
            "  <polygon points=\"{ax},{y0} {bx},{y0} {cx},{y1} {dx},{y1}\" fill=\"{c}\"/>\n",
            ax = center - w0 / 2,
            bx = center + w0 / 2,
            cx = center + w1 / 2,
            dx = center - w1 / 2,
            y0 = y0,
            y1 = y1,
            c = escape(&stage.color)
        ));
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"15\" font-weight=\"bold\" fill=\"#ffffff\">{} · {}</text>\n",
            center,
            y0 + (row_h - 8) / 2 + 5,
            escape(&stage.name),
            escape(&stage.value)
        ));
    }
    out
}

fn render_org_chart(data: &InfographicData) -> String {
    let mut out = String::new();
    let n = data.stages.len().max(1) as u32;
    let root_w = 260;
    let root_x = (CANVAS_WIDTH - root_w) / 2;
    let root_y = 110;
    let child_y = 230;
    let child_w = (CANVAS_WIDTH - 80) / n;

    out.push_str(&format!(
        "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"52\" rx=\"10\" fill=\"#1f2937\"/>\n",
        root_x, root_y, root_w
    ));
    out.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"15\" font-weight=\"bold\" fill=\"#ffffff\">{}</text>\n",
        CANVAS_WIDTH / 2,
        root_y + 32,
        escape(&data.title)
    ));

    for (i, stage) in data.stages.iter().enumerate() {
        let x = 40 + i as u32 * child_w;
        let cx = x + child_w / 2;

        out.push_str(&format!(
            "  <path d=\"M {} {} V {} H {} V {}\" fill=\"none\" stroke=\"#d1d5db\" stroke-width=\"2\"/>\n",
            CANVAS_WIDTH / 2,
            root_y + 52,
            child_y - 30,
            cx,
            child_y
        ));
        out.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"64\" rx=\"10\" fill=\"{c}\" fill-opacity=\"0.15\" stroke=\"{c}\" stroke-width=\"2\"/>\n",
            x + 8,
            child_y,
            child_w - 16,
            c = escape(&stage.color)
        ));
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"14\" font-weight=\"bold\" fill=\"#1f2937\">{}</text>\n",
            cx,
            child_y + 26,
            escape(&stage.name)
        ));
        out.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#4b5563\">{}</text>\n",
            cx,
            child_y + 48,
            escape(&stage.value)
        ));
    }
    out
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mockup::gemini::InfographicData;

    #[test]
    fn test_zoom_clamps_at_both_ends() {
        let mut view = ViewState::new();
        for _ in 0..30 {
            view.zoom_in();
        }
        assert_eq!(view.zoom, MAX_ZOOM);

        for _ in 0..30 {
            view.zoom_out();
        }
        assert_eq!(view.zoom, MIN_ZOOM);

        view.fit();
        assert_eq!(view.zoom, 100);
    }

    #[test]
    fn test_selecting_kind_closes_dropdown() {
        let mut view = ViewState::new();
        view.toggle_dropdown();
        assert!(view.dropdown_open);

        view.select_kind(DiagramKind::Funnel);
        assert_eq!(view.kind, DiagramKind::Funnel);
        assert!(!view.dropdown_open);
    }

    #[test]
    fn test_every_kind_renders_every_stage_name() {
        let data = InfographicData::sample();
        for kind in DiagramKind::ALL {
            let svg = render(&data, kind);
            assert!(svg.starts_with("<svg"), "{:?}", kind);
            assert!(svg.contains(&data.title), "{:?}", kind);
            for stage in &data.stages {
                assert!(svg.contains(&stage.name), "{:?} missing {}", kind, stage.name);
            }
        }
    }

    #[test]
    fn test_stage_colors_appear_in_horizontal_layout() {
        let data = InfographicData::sample();
        let svg = render(&data, DiagramKind::HorizontalTimeline);
        for stage in &data.stages {
            assert!(svg.contains(&stage.color));
        }
    }

    #[test]
    fn test_text_is_xml_escaped() {
        let mut data = InfographicData::sample();
        data.title = "A&B <growth>".to_string();
        let svg = render(&data, DiagramKind::HorizontalTimeline);
        assert!(svg.contains("A&amp;B &lt;growth&gt;"));
        assert!(!svg.contains("<growth>"));
    }

    #[test]
    fn test_labels_cover_the_five_kinds() {
        let labels: Vec<&str> = DiagramKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(
            labels,
            vec!["横向时间轴", "垂直步骤图", "SWOT分析", "漏斗图", "组织架构图"]
        );
    }
}
