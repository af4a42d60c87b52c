//! SVG path data import and export.
//!
//! Handles the `d` attribute grammar for `M L H V C S Q T Z` in absolute and
//! relative forms. Elliptical arcs (`A`) are rejected on import; canvas
//! `arc` segments are flattened into line commands on export.

use canvas_kernel_math::{is_finite_point, Point2};

use crate::error::{PathError, Result};
use crate::flatten::flatten_segment;
use crate::segment::PathSegment;
use crate::Path;

/// Tokenizer and interpreter for SVG path data.
struct PathDataParser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> PathDataParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn skip_separators(&mut self) {
        while let Some(&c) = self.input.get(self.pos) {
            if c.is_ascii_whitespace() || c == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.input.len()
    }

    /// Next byte is the start of a number.
    fn at_number(&mut self) -> bool {
        self.skip_separators();
        matches!(
            self.input.get(self.pos),
            Some(b'0'..=b'9' | b'-' | b'+' | b'.')
        )
    }

    fn command(&mut self) -> Result<char> {
        self.skip_separators();
        let c = self.input[self.pos] as char;
        if c.is_ascii_alphabetic() {
            self.pos += 1;
            Ok(c)
        } else {
            Err(self.error(format!("expected a command, found '{}'", c)))
        }
    }

    fn number(&mut self) -> Result<f64> {
        self.skip_separators();
        let start = self.pos;
        if matches!(self.input.get(self.pos), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        let mut seen_dot = false;
        let mut seen_digit = false;
        while let Some(&c) = self.input.get(self.pos) {
            match c {
                b'0'..=b'9' => seen_digit = true,
                b'.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            self.pos += 1;
        }
        if seen_digit && matches!(self.input.get(self.pos), Some(b'e' | b'E')) {
            let save = self.pos;
            self.pos += 1;
            if matches!(self.input.get(self.pos), Some(b'-' | b'+')) {
                self.pos += 1;
            }
            let exp_start = self.pos;
            while matches!(self.input.get(self.pos), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
            if self.pos == exp_start {
                self.pos = save;
            }
        }
        if !seen_digit {
            self.pos = start;
            return Err(self.error("expected a number".into()));
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("invalid utf-8 in number".into()))?;
        text.parse::<f64>()
            .map_err(|_| self.error(format!("invalid number '{}'", text)))
    }

    fn point(&mut self, origin: Point2, relative: bool) -> Result<Point2> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(if relative {
            Point2::new(origin.x + x, origin.y + y)
        } else {
            Point2::new(x, y)
        })
    }

    fn error(&self, message: String) -> PathError {
        PathError::Syntax {
            offset: self.pos,
            message,
        }
    }

    fn parse(mut self) -> Result<Vec<PathSegment>> {
        let mut segments = Vec::new();
        let mut current = Point2::origin();
        let mut subpath_start = Point2::origin();
        // Reflection sources for S and T.
        let mut last_cubic_control: Option<Point2> = None;
        let mut last_quad_control: Option<Point2> = None;

        while !self.at_end() {
            let cmd = self.command()?;
            let relative = cmd.is_ascii_lowercase();
            let mut first = true;

            loop {
                let mut cubic_control = None;
                let mut quad_control = None;

                match cmd.to_ascii_uppercase() {
                    'M' => {
                        let p = self.point(current, relative)?;
                        if first {
                            segments.push(PathSegment::move_to(p));
                            subpath_start = p;
                        } else {
                            segments.push(PathSegment::line_to(p));
                        }
                        current = p;
                    }
                    'L' => {
                        let p = self.point(current, relative)?;
                        segments.push(PathSegment::line_to(p));
                        current = p;
                    }
                    'H' => {
                        let x = self.number()?;
                        let p = Point2::new(if relative { current.x + x } else { x }, current.y);
                        segments.push(PathSegment::line_to(p));
                        current = p;
                    }
                    'V' => {
                        let y = self.number()?;
                        let p = Point2::new(current.x, if relative { current.y + y } else { y });
                        segments.push(PathSegment::line_to(p));
                        current = p;
                    }
                    'C' => {
                        let c1 = self.point(current, relative)?;
                        let c2 = self.point(current, relative)?;
                        let p = self.point(current, relative)?;
                        segments.push(PathSegment::bezier_curve_to(c1, c2, p));
                        cubic_control = Some(c2);
                        current = p;
                    }
                    'S' => {
                        let c1 = reflect(last_cubic_control, current);
                        let c2 = self.point(current, relative)?;
                        let p = self.point(current, relative)?;
                        segments.push(PathSegment::bezier_curve_to(c1, c2, p));
                        cubic_control = Some(c2);
                        current = p;
                    }
                    'Q' => {
                        let c = self.point(current, relative)?;
                        let p = self.point(current, relative)?;
                        segments.push(PathSegment::quadratic_curve_to(c, p));
                        quad_control = Some(c);
                        current = p;
                    }
                    'T' => {
                        let c = reflect(last_quad_control, current);
                        let p = self.point(current, relative)?;
                        segments.push(PathSegment::quadratic_curve_to(c, p));
                        quad_control = Some(c);
                        current = p;
                    }
                    'Z' => {
                        segments.push(PathSegment::close());
                        current = subpath_start;
                    }
                    'A' => return Err(PathError::UnsupportedCommand(cmd)),
                    _ => {
                        self.pos -= 1;
                        return Err(self.error(format!("unknown command '{}'", cmd)));
                    }
                }

                last_cubic_control = cubic_control;
                last_quad_control = quad_control;
                first = false;

                if cmd.eq_ignore_ascii_case(&'z') || !self.at_number() {
                    break;
                }
            }
        }

        Ok(segments)
    }
}

fn reflect(control: Option<Point2>, about: Point2) -> Point2 {
    match control {
        Some(c) => Point2::new(2.0 * about.x - c.x, 2.0 * about.y - c.y),
        None => about,
    }
}

fn format_number(v: f64, digits: usize) -> String {
    let s = format!("{:.*}", digits, v);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

fn push_point(out: &mut Vec<String>, p: &Point2, digits: usize) {
    out.push(format!("{},{}", format_number(p.x, digits), format_number(p.y, digits)));
}

impl Path {
    /// Parse SVG path data (the `d` attribute) into a path.
    ///
    /// The resulting path uses the non-zero fill rule and is not flagged
    /// `closed`; `Z` commands become `closePath` segments.
    pub fn from_svg_path_data(data: &str) -> Result<Path> {
        let segments = PathDataParser::new(data).parse()?;
        Ok(Path::new(segments))
    }

    /// Serialize the path as SVG path data with absolute commands.
    ///
    /// Arcs are flattened with `tolerance`; malformed segments are skipped.
    pub fn to_svg_path_data(&self, tolerance: f64, digits: usize) -> String {
        let mut out: Vec<String> = Vec::new();
        let mut current = Point2::origin();
        let mut start = Point2::origin();

        for segment in &self.segments {
            match segment {
                PathSegment::MoveTo { points } => {
                    if let Some(p) = points.first().copied().filter(is_finite_point) {
                        out.push("M".into());
                        push_point(&mut out, &p, digits);
                        current = p;
                        start = p;
                    }
                }
                PathSegment::LineTo { points } => {
                    for p in points.iter().filter(|p| is_finite_point(p)) {
                        out.push("L".into());
                        push_point(&mut out, p, digits);
                        current = *p;
                    }
                }
                PathSegment::BezierCurveTo {
                    points,
                    control_points,
                } if control_points.len() >= 2 && !points.is_empty() && segment.is_finite() => {
                    out.push("C".into());
                    push_point(&mut out, &control_points[0], digits);
                    push_point(&mut out, &control_points[1], digits);
                    let end = points[points.len() - 1];
                    push_point(&mut out, &end, digits);
                    current = end;
                }
                PathSegment::QuadraticCurveTo {
                    points,
                    control_points,
                } if !control_points.is_empty() && !points.is_empty() && segment.is_finite() => {
                    out.push("Q".into());
                    push_point(&mut out, &control_points[0], digits);
                    let end = points[points.len() - 1];
                    push_point(&mut out, &end, digits);
                    current = end;
                }
                PathSegment::ClosePath => {
                    out.push("Z".into());
                    current = start;
                }
                _ => {
                    for p in flatten_segment(segment, current, tolerance) {
                        out.push("L".into());
                        push_point(&mut out, &p, digits);
                        current = p;
                    }
                }
            }
        }

        if self.closed && !matches!(self.segments.last(), Some(PathSegment::ClosePath)) && !out.is_empty() {
            out.push("Z".into());
        }
        out.join(" ")
    }
}
