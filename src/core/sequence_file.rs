use crate::domain::model::SequenceData;
use crate::domain::ports::{SequenceSource, Storage};
use crate::utils::error::{Result, StimError};
use csv::{ByteRecord, ReaderBuilder, Trim};

/// 解析逗號分隔的序列文字
///
/// 第一個有超過一個欄位、且至少有一個非空白欄位的列就是參數向量。
/// 空白欄位直接丟掉，其餘欄位必須能解析成有限的 `f64`。
/// 只有被採用的那一列才做 UTF-8 解碼，前面的標頭或註解列可以是任意位元組。
pub fn parse_sequence(source_name: &str, data: &[u8]) -> Result<Vec<f64>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(data);

    let mut record = ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        if record.len() <= 1 {
            continue;
        }

        let tokens: Vec<&[u8]> = record.iter().filter(|t| !t.is_empty()).collect();
        if tokens.is_empty() {
            continue;
        }

        let row = record.position().map(|p| p.line() as usize).unwrap_or(0);
        tracing::debug!(
            "Using row {} of {} ({} values)",
            row,
            source_name,
            tokens.len()
        );

        return tokens
            .into_iter()
            .map(|token| parse_value(source_name, row, token))
            .collect();
    }

    Err(StimError::NoUsableData {
        source_name: source_name.to_string(),
    })
}

fn parse_value(source_name: &str, row: usize, token: &[u8]) -> Result<f64> {
    let parse_error = || StimError::ParseError {
        source_name: source_name.to_string(),
        row,
        token: String::from_utf8_lossy(token).into_owned(),
    };

    let text = std::str::from_utf8(token).map_err(|_| parse_error())?;
    let value = text.parse::<f64>().map_err(|_| parse_error())?;

    // inf / NaN 會讓相位累加整段變成 NaN
    if !value.is_finite() {
        return Err(parse_error());
    }

    Ok(value)
}

/// 時間放大：每個值原地重複 `factor` 次，例如 [a, b] -> [a, a, b, b]
pub fn dilate(values: &[f64], factor: usize) -> Vec<f64> {
    values
        .iter()
        .flat_map(|&v| std::iter::repeat(v).take(factor))
        .collect()
}

/// 透過 `Storage` 讀取資料夾中的序列檔
pub struct FileSequenceSource<S: Storage> {
    storage: S,
}

impl<S: Storage> FileSequenceSource<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: Storage> SequenceSource for FileSequenceSource<S> {
    fn load_sequence(&self, name: &str) -> Result<SequenceData> {
        let data = self.storage.read_file(name)?;
        let values = parse_sequence(name, &data)?;
        tracing::info!("📄 Loaded {} values from {}", values.len(), name);

        Ok(SequenceData {
            name: name.to_string(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_data_row_wins() {
        let text = "header\n1.0, 0.5, -1\n2, 3, 4\n";
        let values = parse_sequence("seq.txt", text.as_bytes()).unwrap();
        assert_eq!(values, vec![1.0, 0.5, -1.0]);
    }

    #[test]
    fn test_blank_tokens_dropped() {
        let text = "0.25,,  ,0.75,\n";
        let values = parse_sequence("seq.txt", text.as_bytes()).unwrap();
        assert_eq!(values, vec![0.25, 0.75]);
    }

    #[test]
    fn test_single_token_rows_skipped() {
        let text = "\n42\n   \n-1,1\n";
        let values = parse_sequence("seq.txt", text.as_bytes()).unwrap();
        assert_eq!(values, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_malformed_token_fails() {
        let text = "1.0,abc,2.0\n";
        let err = parse_sequence("seq.txt", text.as_bytes()).unwrap_err();
        match err {
            StimError::ParseError { token, row, .. } => {
                assert_eq!(token, "abc");
                assert_eq!(row, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_tokens_fail() {
        for (text, bad) in [("1,inf,1\n", "inf"), ("1,NaN,1\n", "NaN")] {
            match parse_sequence("drift.txt", text.as_bytes()) {
                Err(StimError::ParseError { token, source_name, .. }) => {
                    assert_eq!(token, bad);
                    assert_eq!(source_name, "drift.txt");
                }
                other => panic!("{} should not parse: {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_non_utf8_leading_row_skipped() {
        let values = parse_sequence("seq.txt", b"\xff\xfe\n1,2\n").unwrap();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_non_utf8_token_in_data_row_fails() {
        let err = parse_sequence("seq.txt", b"1,\xff,2\n").unwrap_err();
        assert!(matches!(err, StimError::ParseError { row: 1, .. }));
    }

    #[test]
    fn test_empty_file_has_no_usable_data() {
        assert!(matches!(
            parse_sequence("empty.txt", b""),
            Err(StimError::NoUsableData { .. })
        ));
        assert!(matches!(
            parse_sequence("blank.txt", b"\n , ,\n  \n"),
            Err(StimError::NoUsableData { .. })
        ));
    }

    #[test]
    fn test_dilate() {
        assert_eq!(dilate(&[1.0, -1.0], 2), vec![1.0, 1.0, -1.0, -1.0]);
        assert_eq!(dilate(&[1.0, -1.0], 1), vec![1.0, -1.0]);
        assert!(dilate(&[], 3).is_empty());
    }
}
