/// Defines stimuli, their ground truth and their export columns
pub trait Stimulus: Clone + Send + Sync + std::fmt::Debug {
    /// Column names of [`Stimulus::column_values`], stable for a stimulus type.
    const COLUMNS: &'static [&'static str];

    /// Classification label: difficulty tier or congruency condition.
    fn label(&self) -> &'static str;

    /// Ground-truth answer as the participant would have to give it.
    fn expected(&self) -> String;

    fn column_values(&self) -> Vec<String>;
}
