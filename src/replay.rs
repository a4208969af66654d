use std::io::{BufRead, Lines};

use crate::errors::GasIndexError;

/// Reads raw samples, one integer per line. Blank lines and lines starting
/// with `#` are skipped.
pub struct SampleReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> SampleReader<R> {
    pub fn new(reader: R) -> SampleReader<R> {
        SampleReader {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for SampleReader<R> {
    type Item = Result<i32, GasIndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_no += 1;
            if let Some(sample) = parse_line(self.line_no, &line) {
                return Some(sample);
            }
        }
    }
}

/// `None` for lines without a sample.
pub fn parse_line(line_no: usize, line: &str) -> Option<Result<i32, GasIndexError>> {
    let content = line.trim();
    if content.is_empty() || content.starts_with('#') {
        return None;
    }
    Some(content.parse::<i32>().map_err(|_| GasIndexError::ParseSample {
        line: line_no,
        content: content.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn skips_blank_and_comment_lines() {
        let input = "# raw samples\n30000\n\n  29950 \n#\n-1\n";
        let samples: Vec<i32> = SampleReader::new(Cursor::new(input))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(samples, vec![30000, 29950, -1]);
    }

    #[test]
    fn reports_line_of_bad_sample() {
        let input = "30000\n\nabc\n30001\n";
        let results: Vec<_> = SampleReader::new(Cursor::new(input)).collect();
        assert_eq!(results.len(), 3);
        match &results[1] {
            Err(GasIndexError::ParseSample { line, content }) => {
                assert_eq!(*line, 3);
                assert_eq!(content, "abc");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(results[2], Ok(30001)));
    }
}
