use crate::align::result::Hsp;

/// Remove alignments whose query and target ranges both lie inside a
/// higher-scoring alignment of the same frame.
///
/// Output is sorted by score, best first. Of two alignments with equal score
/// and equal ranges only the first is kept; an equal-score alignment that is
/// merely contained in another one stays.
pub fn drop_enveloped(hsps: Vec<Hsp>) -> Vec<Hsp> {
    if hsps.len() < 2 {
        return hsps;
    }
    let mut sorted = hsps;
    sorted.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.query_range.begin.cmp(&b.query_range.begin))
    });

    let mut kept: Vec<Hsp> = Vec::with_capacity(sorted.len());
    for hsp in sorted {
        let enveloped = kept.iter().any(|k| {
            k.frame == hsp.frame
                && hsp.is_enveloped_by(k)
                && (k.score > hsp.score
                    || (k.query_range == hsp.query_range && k.target_range == hsp.target_range))
        });
        if !enveloped {
            kept.push(hsp);
        }
    }
    kept
}
