use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use html5ever::Attribute;

/// Callbacks over the token stream of an HTML document.
///
/// Tag names arrive lower-cased. Text may be split across several `text`
/// calls; character references are already decoded.
pub trait MarkupVisitor {
    fn open(&mut self, _name: &str, _attrs: &Attrs<'_>) {}
    fn close(&mut self, _name: &str) {}
    fn text(&mut self, _text: &str) {}
}

/// Attribute list of a start tag.
pub struct Attrs<'a>(&'a [Attribute]);

impl Attrs<'_> {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| &*attr.value)
    }
}

/// Tokenize `html` and feed every event to `visitor`, returning it afterwards.
pub fn walk<V: MarkupVisitor>(html: &str, visitor: V) -> V {
    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from_slice(html));

    let mut tokenizer = Tokenizer::new(Sink { visitor }, TokenizerOpts::default());
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();
    tokenizer.sink.visitor
}

struct Sink<V> {
    visitor: V,
}

impl<V: MarkupVisitor> TokenSink for Sink<V> {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => self.tag(tag),
            Token::CharacterTokens(text) => {
                self.visitor.text(&text);
                TokenSinkResult::Continue
            }
            _ => TokenSinkResult::Continue,
        }
    }
}

impl<V: MarkupVisitor> Sink<V> {
    fn tag(&mut self, tag: Tag) -> TokenSinkResult<()> {
        let name: &str = &tag.name;
        match tag.kind {
            TagKind::EndTag => {
                self.visitor.close(name);
                TokenSinkResult::Continue
            }
            TagKind::StartTag => {
                self.visitor.open(name, &Attrs(&tag.attrs));
                if tag.self_closing {
                    self.visitor.close(name);
                    return TokenSinkResult::Continue;
                }
                // Without a tree builder the tokenizer needs to be told when
                // an element's body is raw text.
                match raw_kind(name) {
                    Some(kind) => TokenSinkResult::RawData(kind),
                    None => TokenSinkResult::Continue,
                }
            }
        }
    }
}

fn raw_kind(name: &str) -> Option<RawKind> {
    match name {
        "script" => Some(RawKind::ScriptData),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(RawKind::Rawtext),
        "title" | "textarea" => Some(RawKind::Rcdata),
        _ => None,
    }
}
