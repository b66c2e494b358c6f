pub mod convert;
pub mod explain;
pub mod init;
pub mod validate;

use quizforge_core::SkillInfo;

use crate::SkillArgs;

/// Merge skill context per field: flag, then a non-empty batch value, then
/// the config default.
pub fn resolve_skill(args: &SkillArgs, batch: Option<&SkillInfo>, config: &SkillInfo) -> SkillInfo {
    let pick = |flag: &Option<String>, field: fn(&SkillInfo) -> &String| {
        flag.clone()
            .or_else(|| batch.map(field).filter(|v| !v.trim().is_empty()).cloned())
            .unwrap_or_else(|| field(config).clone())
    };
    SkillInfo {
        subject: pick(&args.subject, |s| &s.subject),
        grade: pick(&args.grade, |s| &s.grade),
        skill_name: pick(&args.skill_name, |s| &s.skill_name),
        skill_number: pick(&args.skill_number, |s| &s.skill_number),
    }
}
