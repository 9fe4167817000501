use crate::domain::model::SweepParams;
use crate::utils::error::{Result, StimError};

/// 展開 sweep 軸的笛卡兒積；order 0 是最外層迴圈，最後一軸變化最快
pub fn expand(params: &SweepParams) -> Vec<Vec<f64>> {
    if params.is_empty() {
        return Vec::new();
    }

    let mut rows: Vec<Vec<f64>> = vec![Vec::new()];
    for param in params.iter() {
        let mut next = Vec::with_capacity(rows.len() * param.values.len());
        for row in &rows {
            for &value in &param.values {
                let mut extended = row.clone();
                extended.push(value);
                next.push(extended);
            }
        }
        rows = next;
    }
    rows
}

/// 把 sweep table 寫成 CSV，第一欄是 sweep 編號
pub fn to_csv(params: &SweepParams) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["sweep".to_string()];
    header.extend(params.iter().map(|p| p.name.clone()));
    writer.write_record(&header)?;

    for (index, row) in expand(params).iter().enumerate() {
        let mut record = vec![index.to_string()];
        record.extend(row.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer.into_inner().map_err(|e| StimError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_outer_order_varies_slowest() {
        let params = SweepParams::new()
            .with("Ori", vec![0.0, 90.0], 1)
            .with("SF", vec![0.02, 0.04], 0);

        let rows = expand(&params);
        assert_eq!(
            rows,
            vec![
                vec![0.02, 0.0],
                vec![0.02, 90.0],
                vec![0.04, 0.0],
                vec![0.04, 90.0],
            ]
        );
        assert_eq!(rows.len(), params.condition_count());
    }

    #[test]
    fn test_expand_with_empty_axis() {
        let params = SweepParams::new()
            .with("SF", vec![0.02], 0)
            .with("Phase", vec![], 1);
        assert!(expand(&params).is_empty());
        assert!(expand(&SweepParams::new()).is_empty());
    }

    #[test]
    fn test_to_csv() {
        let params = SweepParams::new()
            .with("Contrast", vec![1.0], 0)
            .with("Color", vec![-1.0, 1.0], 1);

        let csv = String::from_utf8(to_csv(&params).unwrap()).unwrap();
        assert_eq!(csv, "sweep,Contrast,Color\n0,1,-1\n1,1,1\n");
    }
}
