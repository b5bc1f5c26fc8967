//! Tag + code merging.
//!
//! Everything a tag states explicitly wins. Anything the tags leave unset is
//! filled from the detected code shape, except the name: whenever code gives
//! a name, that name is used.

use indexmap::IndexMap;

use crate::detect::{ClassShape, CodeShape, MemberParam, MemberShape};
use crate::doctag::tags::CLASS_TAGS;
use crate::doctag::{DocComment, TagRecord};
use crate::model::{
    Class, Deprecated, EnumInfo, Member, MemberLink, Param, Return, SourceLocation, Tagname, Throws,
    push_unique,
};
use crate::warnings::{WarnKind, Warnings};

/// Output of merging one docset.
#[derive(Debug, Clone, PartialEq)]
pub enum DocFragment {
    Class(Class),
    Member(MemberFragment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberFragment {
    pub member: Member,
    /// Explicit `@member ClassName` owner.
    pub target: Option<String>,
    pub ignore: bool,
}

/// Member tags in precedence order, with the tagname each implies.
const MEMBER_TAGS: &[(&str, Tagname)] = &[
    ("method", Tagname::Method),
    ("event", Tagname::Event),
    ("cfg", Tagname::Cfg),
    ("property", Tagname::Property),
    ("type", Tagname::Property),
    ("var", Tagname::CssVar),
    ("mixin", Tagname::CssMixin),
];

/// Merge one parsed doc-comment with the shape of its code.
pub fn merge(
    doc: &DocComment,
    shape: CodeShape,
    has_code: bool,
    location: SourceLocation,
    warnings: &mut Warnings,
) -> Option<DocFragment> {
    let is_class = CLASS_TAGS.iter().any(|tag| doc.has(tag))
        || (!MEMBER_TAGS.iter().any(|(tag, _)| doc.has(tag)) && matches!(shape, CodeShape::Class(_)));
    if is_class {
        if let Some((tag, _)) = MEMBER_TAGS.iter().find(|(tag, _)| doc.has(tag)) {
            warnings.warn_at(
                WarnKind::MemberClass,
                format!("@{tag} in a class doc-comment is ignored"),
                &location.path,
                location.line,
            );
        }
        return merge_class(doc, shape, location, warnings).map(DocFragment::Class);
    }
    Some(DocFragment::Member(merge_member(doc, shape, has_code, location, warnings)))
}

fn combine_doc(default_doc: &str, main: Option<&TagRecord>) -> String {
    let main_doc = main.map_or("", |tag| tag.doc.as_str());
    match (default_doc.is_empty(), main_doc.is_empty()) {
        (false, false) => format!("{default_doc}\n\n{main_doc}"),
        (false, true) => default_doc.to_string(),
        (true, _) => main_doc.to_string(),
    }
    .trim()
    .to_string()
}

fn meta_of(doc: &DocComment) -> IndexMap<String, String> {
    let mut meta: IndexMap<String, String> = IndexMap::new();
    for tag in doc.tags.iter().filter(|tag| tag.meta) {
        meta.entry(tag.tagname.clone())
            .and_modify(|text| {
                text.push('\n');
                text.push_str(&tag.doc);
            })
            .or_insert_with(|| tag.doc.clone());
    }
    meta
}

fn deprecated_of(doc: &DocComment) -> Option<Deprecated> {
    doc.first("deprecated").map(|tag| Deprecated {
        version: tag.version.clone(),
        text: tag.doc.clone(),
    })
}

fn since_of(doc: &DocComment) -> Option<String> {
    let tag = doc.first("since")?;
    tag.version
        .clone()
        .or_else(|| (!tag.doc.is_empty()).then(|| tag.doc.clone()))
}

fn merge_class(
    doc: &DocComment,
    shape: CodeShape,
    location: SourceLocation,
    warnings: &mut Warnings,
) -> Option<Class> {
    let main = doc.first("class").or_else(|| doc.first("enum"));
    let (code, code_name, values) = match shape {
        CodeShape::Class(class) => {
            let name = class.name.clone();
            (class, name, Vec::new())
        }
        // `/** @class */ My.Foo = {...}` keeps the full chain.
        CodeShape::Member(member) => (ClassShape::default(), member.chain.or(member.name), member.values),
    };

    let name = code_name.or_else(|| main.and_then(|tag| tag.name.clone()));
    let Some(name) = name.filter(|name| !name.is_empty()) else {
        warnings.warn_at(
            WarnKind::NameMissing,
            "class has no name",
            &location.path,
            location.line,
        );
        return None;
    };

    let mut class = Class::new(name);
    class.doc = combine_doc(doc.default_doc(), main);
    class.extends = doc
        .first("extends")
        .and_then(|tag| tag.name.clone())
        .or(code.extends);
    for mixin in doc.names("mixins").into_iter().chain(code.mixins) {
        push_unique(&mut class.mixins, mixin);
    }
    for alt in doc.names("alternateClassNames").into_iter().chain(code.alternate_class_names) {
        push_unique(&mut class.alternate_class_names, alt);
    }
    for alias in doc.names("alias") {
        if alias.contains('#') {
            warnings.warn_at(
                WarnKind::Alias,
                format!("member alias {alias} on class {}", class.name),
                &location.path,
                location.line,
            );
        } else {
            push_unique(&mut class.aliases, alias);
        }
    }
    for xtype in doc.names("xtype") {
        push_unique(&mut class.aliases, format!("widget.{xtype}"));
    }
    for alias in code.aliases {
        push_unique(&mut class.aliases, alias);
    }
    for required in doc.names("requires").into_iter().chain(code.requires) {
        push_unique(&mut class.requires, required);
    }
    for used in doc.names("uses").into_iter().chain(code.uses) {
        push_unique(&mut class.uses, used);
    }
    class.singleton = doc.has("singleton") || code.singleton;
    class.private = doc.has("private");
    class.framework = code.framework;
    class.deprecated = deprecated_of(doc);
    class.meta = meta_of(doc);
    class.since = since_of(doc);
    class.new = doc.has("new");
    class.ignore = doc.has("ignore");
    class.location = Some(location.clone());
    if let Some(tag) = doc.first("enum") {
        class.enum_ = Some(EnumInfo {
            type_: tag.type_.clone(),
            default: None,
        });
    }

    let detected = code.members.into_iter().chain(values);
    class.members = detected
        .filter_map(|shape| autodetected_member(shape, &class.name, &location))
        .collect();
    Some(class)
}

fn autodetected_member(shape: MemberShape, owner: &str, location: &SourceLocation) -> Option<Member> {
    let name = shape.name?;
    let mut member = Member::new(shape.tagname, name);
    member.owner = owner.to_string();
    member.type_ = shape.type_;
    member.default = shape.default;
    member.params = code_params(shape.params);
    member.static_ = shape.static_;
    member.inheritable = shape.inheritable;
    member.accessor = shape.accessor;
    member.chainable = shape.chainable;
    member.body = shape.body;
    member.autodetected = true;
    member.location = Some(location.clone());
    member.refresh_id();
    Some(member)
}

fn code_params(params: Vec<MemberParam>) -> Vec<Param> {
    params
        .into_iter()
        .map(|param| Param {
            default: param.default,
            ..Param::new(param.name)
        })
        .collect()
}

fn tag_param(tag: &TagRecord) -> Param {
    Param {
        name: tag.name.clone().unwrap_or_default(),
        type_: tag.type_.clone(),
        doc: tag.doc.clone(),
        optional: tag.optional == Some(true),
        default: tag.default.clone(),
        properties: tag.properties.iter().map(tag_param).collect(),
        since: None,
        new: false,
    }
}

fn merge_member(
    doc: &DocComment,
    shape: CodeShape,
    has_code: bool,
    location: SourceLocation,
    warnings: &mut Warnings,
) -> MemberFragment {
    let code = match shape {
        CodeShape::Member(member) => member,
        // A member tag on a class-shaped node: keep the name only.
        CodeShape::Class(class) => MemberShape::new(Tagname::Property, class.name),
    };
    let explicit = MEMBER_TAGS
        .iter()
        .find(|(tag, _)| doc.has(tag))
        .map(|(tag, tagname)| (doc.first(tag), *tagname));
    let (main, tagname) = match explicit {
        Some((main, tagname)) => (main, tagname),
        None if !has_code && (doc.has("param") || doc.has("return")) => (None, Tagname::Method),
        None => (None, code.tagname),
    };
    // `@type` carries no name or doc of its own.
    let main = main.filter(|tag| tag.tagname != "type");

    let name = code
        .name
        .clone()
        .or_else(|| main.and_then(|tag| tag.name.clone()))
        .unwrap_or_default();
    if name.is_empty() {
        warnings.warn_at(
            WarnKind::NameMissing,
            format!("{tagname} has no name"),
            &location.path,
            location.line,
        );
    }

    let mut member = Member::new(tagname, name);
    member.doc = combine_doc(doc.default_doc(), main);
    member.type_ = main
        .and_then(|tag| tag.type_.clone())
        .or_else(|| doc.first("type").and_then(|tag| tag.type_.clone()))
        .or(code.type_);
    member.default = main.and_then(|tag| tag.default.clone()).or(code.default);
    member.required = main.is_some_and(|tag| tag.required);

    let tag_params: Vec<Param> = doc.all("param").map(tag_param).collect();
    member.params = if tag_params.is_empty() {
        code_params(code.params)
    } else {
        tag_params
    };
    member.return_ = doc.first("return").map(|tag| Return {
        type_: tag.type_.clone(),
        doc: tag.doc.clone(),
        properties: tag.properties.iter().map(tag_param).collect(),
    });
    member.throws = doc
        .all("throws")
        .map(|tag| Throws {
            type_: tag.type_.clone(),
            doc: tag.doc.clone(),
        })
        .collect();
    member.properties = main.map_or_else(Vec::new, |tag| tag.properties.iter().map(tag_param).collect());

    member.static_ = doc.has("static") || code.static_;
    member.inheritable = doc.has("inheritable") || code.inheritable;
    member.private = doc.has("private");
    member.protected = doc.has("protected");
    member.abstract_ = doc.has("abstract");
    member.readonly = doc.has("readonly");
    member.writeonly = doc.has("writeonly");
    member.template = doc.has("template");
    member.chainable = doc.has("chainable") || (tagname == Tagname::Method && code.chainable);
    member.preventable = doc.has("preventable");
    member.hide = doc.has("hide");
    member.accessor = doc.has("accessor") || code.accessor;
    member.deprecated = deprecated_of(doc);
    member.localdoc = doc.first("localdoc").map(|tag| tag.doc.clone());
    member.meta = meta_of(doc);
    member.since = since_of(doc);
    member.new = doc.has("new");
    member.inheritdoc = doc
        .first("inheritdoc")
        .map(|tag| MemberLink::parse(tag.name.as_deref().unwrap_or_default()));
    member.alias = doc
        .all("alias")
        .filter_map(|tag| tag.name.as_deref())
        .find(|name| name.contains('#'))
        .map(MemberLink::parse);
    let fires = doc.names("fires");
    member.explicit_fires = doc.has("fires");
    for event in fires {
        push_unique(&mut member.fires, event);
    }
    member.body = code.body;
    member.location = Some(location);
    member.refresh_id();

    MemberFragment {
        member,
        target: doc.first("member").and_then(|tag| tag.name.clone()),
        ignore: doc.has("ignore"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::BodyFacts;
    use crate::doctag::{DocTagParser, MetaTagRegistry};

    fn parse(comment: &str) -> DocComment {
        let meta = MetaTagRegistry::new(["author"]);
        DocTagParser::new(&meta).parse(comment)
    }

    fn location() -> SourceLocation {
        SourceLocation::new("src/Foo.js", 3)
    }

    fn merge_one(comment: &str, shape: CodeShape, has_code: bool) -> (Option<DocFragment>, Warnings) {
        let mut warnings = Warnings::default();
        let fragment = merge(&parse(comment), shape, has_code, location(), &mut warnings);
        (fragment, warnings)
    }

    fn member_of(fragment: Option<DocFragment>) -> MemberFragment {
        match fragment {
            Some(DocFragment::Member(member)) => member,
            other => panic!("expected member, got {other:?}"),
        }
    }

    fn class_of(fragment: Option<DocFragment>) -> Class {
        match fragment {
            Some(DocFragment::Class(class)) => class,
            other => panic!("expected class, got {other:?}"),
        }
    }

    fn method_shape(name: &str, params: &[&str]) -> CodeShape {
        let mut shape = MemberShape::new(Tagname::Method, Some(name.to_string()));
        shape.params = params
            .iter()
            .map(|p| MemberParam {
                name: p.to_string(),
                default: None,
            })
            .collect();
        shape.body = Some(BodyFacts::default());
        CodeShape::Member(shape)
    }

    fn unnamed() -> CodeShape {
        CodeShape::Member(MemberShape::new(Tagname::Property, None))
    }

    #[test]
    fn code_name_beats_tag_name() {
        let (fragment, _) = merge_one("* @method tagName\n * Doc.", method_shape("codeName", &[]), true);
        let member = member_of(fragment).member;
        assert_eq!(member.name, "codeName");
        assert_eq!(member.id, "method-codeName");
        assert_eq!(member.doc, "Doc.");
    }

    #[test]
    fn tag_name_without_code() {
        let (fragment, _) = merge_one("* @cfg {String} foo", unnamed(), false);
        let member = member_of(fragment).member;
        assert_eq!(member.tagname, Tagname::Cfg);
        assert_eq!(member.name, "foo");
        assert_eq!(member.type_.as_deref(), Some("String"));
    }

    #[test]
    fn code_params_are_untyped() {
        let (fragment, _) = merge_one("* Some function", method_shape("foo", &["x", "y"]), true);
        let member = member_of(fragment).member;
        assert_eq!(member.tagname, Tagname::Method);
        assert_eq!(member.params.len(), 2);
        assert!(member.params.iter().all(|p| p.type_.is_none()));
    }

    #[test]
    fn tag_params_replace_code_params() {
        let (fragment, _) = merge_one(
            "* @param {Number} a First.\n * @return {Boolean} ok",
            method_shape("foo", &["x", "y"]),
            true,
        );
        let member = member_of(fragment).member;
        assert_eq!(member.params.len(), 1);
        assert_eq!(member.params[0].name, "a");
        assert_eq!(member.return_.unwrap().type_.as_deref(), Some("Boolean"));
    }

    #[test]
    fn params_without_code_imply_method() {
        let (fragment, _) = merge_one("* Does it.\n * @param {String} x", unnamed(), false);
        assert_eq!(member_of(fragment).member.tagname, Tagname::Method);
    }

    #[test]
    fn default_and_main_doc_are_joined() {
        let (fragment, _) = merge_one("* Intro.\n * @event change\n * Fired on change.", unnamed(), false);
        assert_eq!(member_of(fragment).member.doc, "Intro.\n\nFired on change.");
    }

    #[test]
    fn static_ids_and_modifiers() {
        let (fragment, _) = merge_one("* @method make\n * @static\n * @private\n * @fires created", unnamed(), false);
        let member = member_of(fragment).member;
        assert!(member.static_ && member.private);
        assert_eq!(member.id, "static-method-make");
        assert_eq!(member.fires, vec!["created"]);
        assert!(member.explicit_fires);
    }

    #[test]
    fn member_target_and_ignore() {
        let (fragment, _) = merge_one("* @property bar\n * @member Other\n * @ignore", unnamed(), false);
        let fragment = member_of(fragment);
        assert_eq!(fragment.target.as_deref(), Some("Other"));
        assert!(fragment.ignore);
    }

    #[test]
    fn member_alias_reference() {
        let (fragment, _) = merge_one("* @method foobar\n * @alias Foo#bar", unnamed(), false);
        let alias = member_of(fragment).member.alias.unwrap();
        assert_eq!(alias.class.as_deref(), Some("Foo"));
        assert_eq!(alias.member.as_deref(), Some("bar"));
    }

    #[test]
    fn class_from_tags_and_code() {
        let code = ClassShape {
            name: Some("My.Panel".to_string()),
            extends: Some("Ext.Panel".to_string()),
            mixins: vec!["My.Mixin".to_string()],
            framework: true,
            members: vec![{
                let mut run = MemberShape::new(Tagname::Method, Some("run".to_string()));
                run.body = Some(BodyFacts::default());
                run
            }],
            ..ClassShape::default()
        };
        let (fragment, _) = merge_one(
            "* A panel.\n * @class Ignored.Name\n * @mixins Other.Mixin\n * @xtype mypanel\n * @author Someone",
            CodeShape::Class(code),
            true,
        );
        let class = class_of(fragment);
        assert_eq!(class.name, "My.Panel");
        assert_eq!(class.doc, "A panel.");
        assert_eq!(class.extends.as_deref(), Some("Ext.Panel"));
        assert_eq!(class.mixins, vec!["Other.Mixin", "My.Mixin"]);
        assert_eq!(class.aliases, vec!["widget.mypanel"]);
        assert!(class.framework);
        assert_eq!(class.meta.get("author").map(String::as_str), Some("Someone"));
        assert_eq!(class.members.len(), 1);
        assert!(class.members[0].autodetected);
        assert_eq!(class.members[0].owner, "My.Panel");
    }

    #[test]
    fn enum_keeps_full_chain_and_values() {
        let mut shape = MemberShape::new(Tagname::Property, Some("Color".to_string()));
        shape.chain = Some("My.Color".to_string());
        let mut red = MemberShape::new(Tagname::Property, Some("RED".to_string()));
        red.type_ = Some("String".to_string());
        red.default = Some("'red'".to_string());
        shape.values = vec![red];
        let (fragment, _) = merge_one("* @enum {String}\n * Colors.", CodeShape::Member(shape), true);
        let class = class_of(fragment);
        assert_eq!(class.name, "My.Color");
        assert_eq!(class.enum_.unwrap().type_.as_deref(), Some("String"));
        assert_eq!(class.members[0].default.as_deref(), Some("'red'"));
    }

    #[test]
    fn nameless_class_is_dropped_with_warning() {
        let (fragment, warnings) = merge_one("* @class", unnamed(), false);
        assert!(fragment.is_none());
        assert_eq!(warnings.count(WarnKind::NameMissing), 1);
    }

    #[test]
    fn member_tag_in_class_comment_warns() {
        let (fragment, warnings) = merge_one("* @class My.Panel\n * @cfg {String} title", unnamed(), false);
        assert!(matches!(fragment, Some(DocFragment::Class(class)) if class.name == "My.Panel"));
        assert_eq!(warnings.count(WarnKind::MemberClass), 1);
        assert_eq!(warnings.emitted()[0].line, Some(3));
    }

    #[test]
    fn deprecated_and_since() {
        let (fragment, _) = merge_one("* @property x\n * @deprecated 5.0 Gone.\n * @since 4.2", unnamed(), false);
        let member = member_of(fragment).member;
        let deprecated = member.deprecated.unwrap();
        assert_eq!(deprecated.version.as_deref(), Some("5.0"));
        assert_eq!(deprecated.text, "Gone.");
        assert_eq!(member.since.as_deref(), Some("4.2"));
    }
}
